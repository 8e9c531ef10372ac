use serde::{Deserialize, Serialize};

use crate::domain::moves::{MoveId, MoveType, OrdersId};
use crate::flows::path::PathParams;

/// What the wizard knows about the service member's move right now.
///
/// Every field defaults, so a partially populated snapshot still evaluates:
/// a rule that inspects an absent field reads it as "not in flow".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowState {
    pub service_member_id: Option<String>,
    pub selected_move_type: Option<MoveType>,
    pub has_move: bool,
    pub move_id: Option<MoveId>,
    pub current_orders_id: Option<OrdersId>,
}

impl FlowState {
    pub fn for_service_member(service_member_id: impl Into<String>) -> Self {
        Self { service_member_id: Some(service_member_id.into()), ..Self::default() }
    }

    pub fn with_move_type(mut self, move_type: MoveType) -> Self {
        self.selected_move_type = Some(move_type);
        self
    }

    pub fn with_orders(mut self, orders_id: OrdersId) -> Self {
        self.current_orders_id = Some(orders_id);
        self
    }

    pub fn with_move(mut self, move_id: MoveId) -> Self {
        self.move_id = Some(move_id);
        self.has_move = true;
        self
    }

    /// Path parameters the wizard can fill on its own when linking pages.
    pub fn path_params(&self) -> PathParams {
        let mut params = PathParams::default();
        if let Some(service_member_id) = &self.service_member_id {
            params.insert("service_member_id", service_member_id.clone());
        }
        if let Some(move_id) = &self.move_id {
            params.insert("move_id", move_id.0.clone());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::FlowState;
    use crate::domain::moves::{MoveId, MoveType};

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let state: FlowState =
            serde_json::from_str(r#"{"selected_move_type":"PPM"}"#).expect("partial state");

        assert_eq!(state.selected_move_type, Some(MoveType::Ppm));
        assert!(!state.has_move);
        assert_eq!(state.move_id, None);
    }

    #[test]
    fn path_params_include_known_identifiers_only() {
        let state = FlowState::for_service_member("sm-7").with_move(MoveId("move-9".to_string()));
        let params = state.path_params();

        assert_eq!(params.get("service_member_id"), Some("sm-7"));
        assert_eq!(params.get("move_id"), Some("move-9"));
        assert!(FlowState::default().path_params().is_empty());
    }
}
