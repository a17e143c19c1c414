use bytes::{BufMut, BytesMut};

use crate::error::{ProtocolError, Result};
use crate::models::{OutPinLevel, GATE_COUNT};
use crate::reader::PayloadReader;

const REPORT_HEAD: u8 = 0xAA;
const REPORT_TAIL: u8 = 0x55;
const REPORT_CALIBRATION: u8 = 0x00;

/// Report flavors, tagged by the first body byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(u8)]
pub enum ReportKind {
    Engineering = 1,
    Basic = 2,
}

impl ReportKind {
    fn from_byte(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ReportKind::Engineering),
            2 => Ok(ReportKind::Basic),
            other => Err(ProtocolError::UnknownValue {
                field: "report kind",
                value: other as u32,
            }),
        }
    }
}

/// Detection state flags of the tracked target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TargetStatus(pub u8);

impl TargetStatus {
    pub const MOTION: u8 = 0x01;
    pub const STANDSTILL: u8 = 0x02;

    /// A moving target is detected.
    pub fn moving(self) -> bool {
        self.0 & Self::MOTION != 0
    }

    /// A stationary target is detected.
    pub fn stationary(self) -> bool {
        self.0 & Self::STANDSTILL != 0
    }

    /// Any target is detected.
    pub fn present(self) -> bool {
        self.0 & (Self::MOTION | Self::STANDSTILL) != 0
    }
}

/// The basic part of every detection report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BasicReport {
    pub target_status: TargetStatus,
    /// Distance of the moving target, centimeters.
    pub motion_distance: u16,
    /// Energy of the moving target, percent.
    pub motion_energy: u8,
    /// Distance of the stationary target, centimeters.
    pub standstill_distance: u16,
    /// Energy of the stationary target, percent.
    pub standstill_energy: u8,
    /// Overall detection distance, centimeters.
    pub detection_distance: u16,
}

/// The engineering extension, present only in engineering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EngineeringReport {
    pub motion_max_distance_gate: u8,
    pub standstill_max_distance_gate: u8,
    /// Motion energy per gate, percent.
    pub motion_gate_energy: [u8; GATE_COUNT],
    /// Standstill energy per gate, percent.
    pub standstill_gate_energy: [u8; GATE_COUNT],
    /// Photo-sensor reading, 0 to 255.
    pub photosensitive_value: u8,
    pub out_pin_status: OutPinLevel,
}

/// One decoded detection report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Report {
    /// Always present.
    pub basic: BasicReport,
    /// Present iff the device is in engineering mode.
    pub engineering: Option<EngineeringReport>,
}

impl Report {
    /// Decode a report from a report-class frame body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut r = PayloadReader::new(body);
        let kind = ReportKind::from_byte(r.u8()?)?;
        r.marker("report head", REPORT_HEAD)?;

        let basic = BasicReport {
            target_status: TargetStatus(r.u8()?),
            motion_distance: r.u16_le()?,
            motion_energy: r.u8()?,
            standstill_distance: r.u16_le()?,
            standstill_energy: r.u8()?,
            detection_distance: r.u16_le()?,
        };

        let engineering = match kind {
            ReportKind::Basic => None,
            ReportKind::Engineering => Some(EngineeringReport {
                motion_max_distance_gate: r.u8()?,
                standstill_max_distance_gate: r.u8()?,
                motion_gate_energy: r.array()?,
                standstill_gate_energy: r.array()?,
                photosensitive_value: r.u8()?,
                out_pin_status: OutPinLevel::from_value(r.u8()? as u32)?,
            }),
        };

        r.marker("report tail", REPORT_TAIL)?;
        r.marker("report calibration", REPORT_CALIBRATION)?;
        r.finish()?;
        Ok(Report { basic, engineering })
    }

    /// Encode a report body (device side; used by the test emulator).
    pub fn encode(&self, dst: &mut BytesMut) {
        let kind = if self.engineering.is_some() {
            ReportKind::Engineering
        } else {
            ReportKind::Basic
        };
        dst.put_u8(kind as u8);
        dst.put_u8(REPORT_HEAD);

        dst.put_u8(self.basic.target_status.0);
        dst.put_u16_le(self.basic.motion_distance);
        dst.put_u8(self.basic.motion_energy);
        dst.put_u16_le(self.basic.standstill_distance);
        dst.put_u8(self.basic.standstill_energy);
        dst.put_u16_le(self.basic.detection_distance);

        if let Some(eng) = &self.engineering {
            dst.put_u8(eng.motion_max_distance_gate);
            dst.put_u8(eng.standstill_max_distance_gate);
            dst.put_slice(&eng.motion_gate_energy);
            dst.put_slice(&eng.standstill_gate_energy);
            dst.put_u8(eng.photosensitive_value);
            dst.put_u8(eng.out_pin_status as u8);
        }

        dst.put_u8(REPORT_TAIL);
        dst.put_u8(REPORT_CALIBRATION);
    }
}
