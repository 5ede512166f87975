#![forbid(unsafe_code)]

pub mod fields;

pub mod ids {
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct TenantId(String);

    impl TenantId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, TenantIdError> {
            let value = value.into();
            validate_tenant_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum TenantIdError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    fn validate_tenant_id(value: &str) -> Result<(), TenantIdError> {
        if value.is_empty() {
            return Err(TenantIdError::Empty);
        }
        if value.len() > 128 {
            return Err(TenantIdError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(TenantIdError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(TenantIdError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                continue;
            }
            return Err(TenantIdError::InvalidChar { ch, index });
        }
        Ok(())
    }
}

pub mod model {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ProcedureCategory {
        Inspection,
        Safety,
        Calibration,
        ReactiveMaintenance,
        PreventiveMaintenance,
        QualityControl,
        Training,
        Other,
    }

    impl ProcedureCategory {
        pub fn as_str(self) -> &'static str {
            match self {
                ProcedureCategory::Inspection => "inspection",
                ProcedureCategory::Safety => "safety",
                ProcedureCategory::Calibration => "calibration",
                ProcedureCategory::ReactiveMaintenance => "reactive_maintenance",
                ProcedureCategory::PreventiveMaintenance => "preventive_maintenance",
                ProcedureCategory::QualityControl => "quality_control",
                ProcedureCategory::Training => "training",
                ProcedureCategory::Other => "other",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "inspection" => Some(ProcedureCategory::Inspection),
                "safety" => Some(ProcedureCategory::Safety),
                "calibration" => Some(ProcedureCategory::Calibration),
                "reactive_maintenance" => Some(ProcedureCategory::ReactiveMaintenance),
                "preventive_maintenance" => Some(ProcedureCategory::PreventiveMaintenance),
                "quality_control" => Some(ProcedureCategory::QualityControl),
                "training" => Some(ProcedureCategory::Training),
                "other" => Some(ProcedureCategory::Other),
                _ => None,
            }
        }

        pub const ALL: &[ProcedureCategory] = &[
            ProcedureCategory::Inspection,
            ProcedureCategory::Safety,
            ProcedureCategory::Calibration,
            ProcedureCategory::ReactiveMaintenance,
            ProcedureCategory::PreventiveMaintenance,
            ProcedureCategory::QualityControl,
            ProcedureCategory::Training,
            ProcedureCategory::Other,
        ];
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ExecutionStatus {
        InProgress,
        Completed,
        Cancelled,
    }

    impl ExecutionStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                ExecutionStatus::InProgress => "in_progress",
                ExecutionStatus::Completed => "completed",
                ExecutionStatus::Cancelled => "cancelled",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "in_progress" => Some(ExecutionStatus::InProgress),
                "completed" => Some(ExecutionStatus::Completed),
                "cancelled" => Some(ExecutionStatus::Cancelled),
                _ => None,
            }
        }

        pub fn is_terminal(self) -> bool {
            matches!(
                self,
                ExecutionStatus::Completed | ExecutionStatus::Cancelled
            )
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum InspectionResult {
        Pass,
        Fail,
        Flag,
    }

    impl InspectionResult {
        pub fn as_str(self) -> &'static str {
            match self {
                InspectionResult::Pass => "pass",
                InspectionResult::Fail => "fail",
                InspectionResult::Flag => "flag",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "pass" => Some(InspectionResult::Pass),
                "fail" => Some(InspectionResult::Fail),
                "flag" => Some(InspectionResult::Flag),
                _ => None,
            }
        }

        pub fn needs_attention(self) -> bool {
            matches!(self, InspectionResult::Fail | InspectionResult::Flag)
        }
    }
}
