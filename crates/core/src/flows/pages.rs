use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::moves::MoveType;
use crate::flows::path::PathPattern;
use crate::flows::state::FlowState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKey {
    ServiceMemberCreate,
    ServiceMemberName,
    ContactInfo,
    DutyStation,
    ResidenceAddress,
    BackupMailingAddress,
    BackupContacts,
    ServiceMemberTransition,
    Orders,
    UploadOrders,
    OrdersTransition,
    MoveType,
    HhgSchedule,
    HhgAddress,
    PpmTransition,
    PpmStart,
    PpmSize,
    PpmIncentive,
    Review,
    Agreement,
}

impl PageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceMemberCreate => "service-member-create",
            Self::ServiceMemberName => "service-member-name",
            Self::ContactInfo => "contact-info",
            Self::DutyStation => "duty-station",
            Self::ResidenceAddress => "residence-address",
            Self::BackupMailingAddress => "backup-mailing-address",
            Self::BackupContacts => "backup-contacts",
            Self::ServiceMemberTransition => "service-member-transition",
            Self::Orders => "orders",
            Self::UploadOrders => "upload-orders",
            Self::OrdersTransition => "orders-transition",
            Self::MoveType => "move-type",
            Self::HhgSchedule => "hhg-schedule",
            Self::HhgAddress => "hhg-address",
            Self::PpmTransition => "ppm-transition",
            Self::PpmStart => "ppm-start",
            Self::PpmSize => "ppm-size",
            Self::PpmIncentive => "ppm-incentive",
            Self::Review => "review",
            Self::Agreement => "agreement",
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(value.trim().to_string()))
            .map_err(|_| format!("unknown wizard page `{value}`"))
    }
}

/// Decides whether a page is reachable for a given wizard state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlowRule {
    Always,
    HasHhg,
    HasPpm,
    IsCombo,
    PpmOnly,
}

impl InFlowRule {
    pub fn evaluate(&self, state: &FlowState) -> bool {
        let move_type = state.selected_move_type;
        match self {
            Self::Always => true,
            Self::HasHhg => matches!(move_type, Some(selected) if selected != MoveType::Ppm),
            Self::HasPpm => matches!(move_type, Some(selected) if selected != MoveType::Hhg),
            Self::IsCombo => move_type == Some(MoveType::HhgPpm),
            Self::PpmOnly => move_type == Some(MoveType::Ppm),
        }
    }
}

/// The kind of view a page renders; the concrete view is the renderer's call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageView {
    /// A dedicated form for the page key.
    Form,
    /// An interstitial with nothing to submit.
    Transition,
    /// A page not built yet; shows its title and description.
    Placeholder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitBehavior {
    Advance,
    CreateMoveIfMissing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageDescriptor {
    pub key: PageKey,
    pub path: PathPattern,
    pub rule: InFlowRule,
    pub view: PageView,
    pub description: Option<&'static str>,
    pub submit: SubmitBehavior,
}

impl PageDescriptor {
    pub fn new(key: PageKey, path: &str, rule: InFlowRule, view: PageView) -> Self {
        Self {
            key,
            path: PathPattern::new(path),
            rule,
            view,
            description: None,
            submit: SubmitBehavior::Advance,
        }
    }

    pub fn form(key: PageKey, path: &str) -> Self {
        Self::new(key, path, InFlowRule::Always, PageView::Form)
    }

    pub fn described(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn creates_move(mut self) -> Self {
        self.submit = SubmitBehavior::CreateMoveIfMissing;
        self
    }

    pub fn is_in_flow(&self, state: &FlowState) -> bool {
        self.rule.evaluate(state)
    }
}

#[cfg(test)]
mod tests {
    use super::{InFlowRule, PageKey};
    use crate::domain::moves::MoveType;
    use crate::flows::state::FlowState;

    fn with_type(move_type: Option<MoveType>) -> FlowState {
        FlowState { selected_move_type: move_type, ..FlowState::default() }
    }

    #[test]
    fn type_dependent_rules_are_false_without_selection() {
        let state = with_type(None);
        assert!(InFlowRule::Always.evaluate(&state));
        assert!(!InFlowRule::HasHhg.evaluate(&state));
        assert!(!InFlowRule::HasPpm.evaluate(&state));
        assert!(!InFlowRule::IsCombo.evaluate(&state));
        assert!(!InFlowRule::PpmOnly.evaluate(&state));
    }

    #[test]
    fn combo_satisfies_both_leg_rules_but_not_ppm_only() {
        let state = with_type(Some(MoveType::HhgPpm));
        assert!(InFlowRule::HasHhg.evaluate(&state));
        assert!(InFlowRule::HasPpm.evaluate(&state));
        assert!(InFlowRule::IsCombo.evaluate(&state));
        assert!(!InFlowRule::PpmOnly.evaluate(&state));
    }

    #[test]
    fn single_leg_types_exclude_the_other_leg() {
        let hhg = with_type(Some(MoveType::Hhg));
        assert!(InFlowRule::HasHhg.evaluate(&hhg));
        assert!(!InFlowRule::HasPpm.evaluate(&hhg));

        let ppm = with_type(Some(MoveType::Ppm));
        assert!(!InFlowRule::HasHhg.evaluate(&ppm));
        assert!(InFlowRule::HasPpm.evaluate(&ppm));
        assert!(InFlowRule::PpmOnly.evaluate(&ppm));
    }

    #[test]
    fn page_keys_parse_from_their_slugs() {
        assert_eq!("ppm-incentive".parse::<PageKey>(), Ok(PageKey::PpmIncentive));
        assert_eq!(PageKey::ServiceMemberCreate.to_string(), "service-member-create");
        assert!("garage-sale".parse::<PageKey>().is_err());
    }
}
