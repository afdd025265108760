//! Barcode label parsing.
//!
//! Labels are `#`-separated: `lotId#machineName#rollNo` for pick and load,
//! `lotId#machineName#rollNo#fgRollNo` for the combined pick and load flow.
//! The scanner terminates each label with Enter, which is stripped before
//! parsing.

use serde::Serialize;

use crate::domain::errors::WorkflowError;
use crate::domain::types::{LotNo, MachineName, RollNo};
use crate::domain::variant::WorkflowVariant;

pub const SCAN_DELIMITER: char = '#';

/// Fields decoded from one scanned roll label.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ScanCode {
    pub lot_no: LotNo,
    pub machine_name: MachineName,
    pub roll_no: RollNo,
    /// Finished-goods roll number, present on four-field labels only.
    pub fg_roll_no: Option<RollNo>,
}

impl ScanCode {
    /// Parses a raw label for the given variant.
    ///
    /// Fields beyond the variant's required count are ignored.
    pub fn parse(raw: &str, variant: WorkflowVariant) -> Result<Self, WorkflowError> {
        let raw = raw.trim();
        let fields: Vec<&str> = raw.split(SCAN_DELIMITER).map(str::trim).collect();
        let required = variant.scan_field_count();

        if fields.len() < required {
            return Err(WorkflowError::MalformedInput(format!(
                "expected {required} fields separated by '{SCAN_DELIMITER}', got {}",
                fields.len()
            )));
        }

        let field = |index: usize, name: &str| match fields[index] {
            "" => Err(WorkflowError::MalformedInput(format!("{name} is empty"))),
            value => Ok(value),
        };

        let lot_no = LotNo::new(field(0, "lot number")?).map_err(malformed)?;
        let machine_name = MachineName::new(field(1, "machine name")?).map_err(malformed)?;
        let roll_no = RollNo::new(field(2, "roll number")?).map_err(malformed)?;
        let fg_roll_no = if required > 3 {
            Some(RollNo::new(field(3, "finished roll number")?).map_err(malformed)?)
        } else {
            None
        };

        Ok(Self {
            lot_no,
            machine_name,
            roll_no,
            fg_roll_no,
        })
    }

    /// Roll number identifying the unit inside its lot.
    pub fn unit_roll_no(&self) -> &RollNo {
        self.fg_roll_no.as_ref().unwrap_or(&self.roll_no)
    }
}

fn malformed(err: impl std::fmt::Display) -> WorkflowError {
    WorkflowError::MalformedInput(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_field_labels() {
        let code = ScanCode::parse("L1#M1#R1", WorkflowVariant::Pick).unwrap();
        assert_eq!(code.lot_no.as_str(), "L1");
        assert_eq!(code.machine_name.as_str(), "M1");
        assert_eq!(code.roll_no.as_str(), "R1");
        assert_eq!(code.fg_roll_no, None);
        assert_eq!(code.unit_roll_no().as_str(), "R1");
    }

    #[test]
    fn parses_four_field_labels() {
        let code = ScanCode::parse("L1#M1#R1#FG7\r\n", WorkflowVariant::PickLoad).unwrap();
        assert_eq!(code.unit_roll_no().as_str(), "FG7");
        assert_eq!(code.roll_no.as_str(), "R1");
    }

    #[test]
    fn three_field_variants_ignore_extra_fields() {
        let code = ScanCode::parse("L1#M1#R1#FG7", WorkflowVariant::Load).unwrap();
        assert_eq!(code.fg_roll_no, None);
    }

    #[test]
    fn rejects_labels_without_delimiters() {
        let err = ScanCode::parse("garbage", WorkflowVariant::Pick).unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedInput(_)));
    }

    #[test]
    fn rejects_short_labels_for_combined_flow() {
        let err = ScanCode::parse("L1#M1#R1", WorkflowVariant::PickLoad).unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedInput(_)));
    }

    #[test]
    fn rejects_blank_fields() {
        let err = ScanCode::parse("L1##R1", WorkflowVariant::Pick).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::MalformedInput("machine name is empty".to_string())
        );
    }
}
