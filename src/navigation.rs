use serde::{Deserialize, Serialize};

/// The four detail tables reachable from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailMode {
    Predicted,
    AllUnpaid,
    PaidHistory,
    CheckSearch,
}

/// Where the user currently is in the drill-down hierarchy.
///
/// The filter of `DetailByMode` holds whatever the active mode searches on —
/// a company name for the ledger views, a check number for check search.
/// Because a stale value from one mode is meaningless in another, every mode
/// switch clears it; that reset lives in [`NavigationState::apply`] so it
/// cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationState {
    SummaryByDepartment,
    SummaryByCompanyWithinDepartment { department: String },
    DetailByMode { mode: DetailMode, filter: String },
}

/// Discrete user-selection events driving the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavEvent {
    SelectDepartment(String),
    SelectCompany(String),
    Back,
    SelectMode(DetailMode),
    SetFilter(String),
    Clear,
}

impl Default for NavigationState {
    fn default() -> Self {
        NavigationState::SummaryByDepartment
    }
}

impl NavigationState {
    /// Entry point for a chart click that already knows the department:
    /// seeds the company summary directly, bypassing the department list.
    pub fn drill_into_department(department: impl Into<String>) -> Self {
        NavigationState::SummaryByCompanyWithinDepartment {
            department: department.into(),
        }
    }

    /// Pure transition function. The state machine is long-lived and cycles
    /// indefinitely; there is no terminal state.
    pub fn apply(self, event: NavEvent) -> NavigationState {
        match event {
            NavEvent::SelectDepartment(department) => {
                NavigationState::SummaryByCompanyWithinDepartment { department }
            }
            // Picking a company from the company summary drills into the
            // unpaid detail table filtered to it; inside a detail view the
            // company lands in the active filter without changing mode.
            NavEvent::SelectCompany(company) => match self {
                NavigationState::SummaryByCompanyWithinDepartment { .. } => {
                    NavigationState::DetailByMode {
                        mode: DetailMode::AllUnpaid,
                        filter: company,
                    }
                }
                NavigationState::DetailByMode { mode, .. } => NavigationState::DetailByMode {
                    mode,
                    filter: company,
                },
                state => state,
            },
            NavEvent::Back => match self {
                NavigationState::SummaryByCompanyWithinDepartment { .. }
                | NavigationState::DetailByMode { .. } => NavigationState::SummaryByDepartment,
                state => state,
            },
            // Switching mode always clears the filter, from any state.
            NavEvent::SelectMode(mode) => NavigationState::DetailByMode {
                mode,
                filter: String::new(),
            },
            NavEvent::SetFilter(value) => match self {
                NavigationState::DetailByMode { mode, .. } => NavigationState::DetailByMode {
                    mode,
                    filter: value,
                },
                // Filters only exist inside detail views.
                state => state,
            },
            NavEvent::Clear => NavigationState::SummaryByDepartment,
        }
    }

    pub fn active_filter(&self) -> Option<&str> {
        match self {
            NavigationState::DetailByMode { filter, .. } if !filter.is_empty() => Some(filter),
            _ => None,
        }
    }

    pub fn selected_department(&self) -> Option<&str> {
        match self {
            NavigationState::SummaryByCompanyWithinDepartment { department } => Some(department),
            _ => None,
        }
    }
}
