use serde::Serialize;

use crate::domain::moves::OrdersId;
use crate::errors::DomainError;
use crate::flows::pages::{PageDescriptor, PageKey, PageView, SubmitBehavior};
use crate::flows::path::{PathParams, PathPattern};
use crate::flows::state::FlowState;

/// Neighbours of a page within the in-flow list. `None` disables the
/// matching button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub current: PageKey,
    pub position: Option<usize>,
    pub total: usize,
    pub previous: Option<PageKey>,
    pub next: Option<PageKey>,
}

impl Navigation {
    pub fn locate(current: PageKey, pages: &[PageKey]) -> Self {
        let position = pages.iter().position(|key| *key == current);
        let (previous, next) = match position {
            Some(index) => (
                index.checked_sub(1).and_then(|previous| pages.get(previous)).copied(),
                pages.get(index + 1).copied(),
            ),
            None => (None, None),
        };
        Self { current, position, total: pages.len(), previous, next }
    }

    pub fn is_first(&self) -> bool {
        self.position.is_some() && self.previous.is_none()
    }

    pub fn is_last(&self) -> bool {
        self.position.is_some() && self.next.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubmitAction {
    Advance,
    CreateMove { orders_id: OrdersId },
}

/// Everything an in-flow page needs to render itself: its key, the ordered
/// in-flow list, its description and the wizard state it was resolved for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WizardPage {
    pub key: PageKey,
    pub pages: Vec<PageKey>,
    pub description: Option<&'static str>,
    pub view: PageView,
    pub submit: SubmitBehavior,
    pub state: FlowState,
    patterns: Vec<(PageKey, PathPattern)>,
}

impl WizardPage {
    pub(crate) fn new(
        descriptor: &PageDescriptor,
        pages: Vec<PageKey>,
        patterns: Vec<(PageKey, PathPattern)>,
        state: &FlowState,
    ) -> Self {
        Self {
            key: descriptor.key,
            pages,
            description: descriptor.description,
            view: descriptor.view,
            submit: descriptor.submit,
            state: state.clone(),
            patterns,
        }
    }

    pub fn navigation(&self) -> Navigation {
        Navigation::locate(self.key, &self.pages)
    }

    pub fn next_path(&self, extra: &PathParams) -> Result<Option<String>, DomainError> {
        self.neighbour_path(self.navigation().next, extra)
    }

    pub fn previous_path(&self, extra: &PathParams) -> Result<Option<String>, DomainError> {
        self.neighbour_path(self.navigation().previous, extra)
    }

    pub fn submit_action(&self) -> Result<SubmitAction, DomainError> {
        match self.submit {
            SubmitBehavior::Advance => Ok(SubmitAction::Advance),
            SubmitBehavior::CreateMoveIfMissing if self.state.has_move => Ok(SubmitAction::Advance),
            SubmitBehavior::CreateMoveIfMissing => match &self.state.current_orders_id {
                Some(orders_id) => Ok(SubmitAction::CreateMove { orders_id: orders_id.clone() }),
                None => Err(DomainError::MissingOrders(self.key)),
            },
        }
    }

    fn neighbour_path(
        &self,
        neighbour: Option<PageKey>,
        extra: &PathParams,
    ) -> Result<Option<String>, DomainError> {
        let Some(neighbour) = neighbour else {
            return Ok(None);
        };
        let pattern = self
            .patterns
            .iter()
            .find(|(key, _)| *key == neighbour)
            .map(|(_, pattern)| pattern)
            .ok_or_else(|| {
                DomainError::InvariantViolation(format!(
                    "in-flow page `{neighbour}` has no declared path"
                ))
            })?;
        let params = self.state.path_params().merged(extra);
        pattern.fill(&params).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::Navigation;
    use crate::flows::pages::PageKey;

    const PAGES: [PageKey; 3] = [PageKey::Orders, PageKey::UploadOrders, PageKey::OrdersTransition];

    #[test]
    fn middle_page_has_both_neighbours() {
        let navigation = Navigation::locate(PageKey::UploadOrders, &PAGES);

        assert_eq!(navigation.position, Some(1));
        assert_eq!(navigation.previous, Some(PageKey::Orders));
        assert_eq!(navigation.next, Some(PageKey::OrdersTransition));
        assert_eq!(navigation.total, 3);
    }

    #[test]
    fn ends_of_the_list_disable_navigation() {
        let first = Navigation::locate(PageKey::Orders, &PAGES);
        assert_eq!(first.previous, None);
        assert!(first.is_first());

        let last = Navigation::locate(PageKey::OrdersTransition, &PAGES);
        assert_eq!(last.next, None);
        assert!(last.is_last());
    }

    #[test]
    fn page_outside_the_list_has_no_neighbours() {
        let navigation = Navigation::locate(PageKey::PpmStart, &PAGES);

        assert_eq!(navigation.position, None);
        assert_eq!(navigation.previous, None);
        assert_eq!(navigation.next, None);
        assert!(!navigation.is_first());
        assert!(!navigation.is_last());
    }

    #[test]
    fn single_page_list_is_both_first_and_last() {
        let navigation = Navigation::locate(PageKey::Review, &[PageKey::Review]);
        assert!(navigation.is_first());
        assert!(navigation.is_last());
    }
}
