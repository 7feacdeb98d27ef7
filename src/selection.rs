use serde::Deserialize;

use crate::calendar::{compute_grid, CalendarCell, DateKey, MonthIndex};
use crate::error::{Error, ErrorKind, Result};
use crate::memo::{MemoMap, MemoStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// What happens to the selection when the displayed month changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationPolicy {
    KeepSelection,
    ClearSelection,
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        NavigationPolicy::KeepSelection
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NavigateMonth(Direction),
    GoToToday,
    SelectDate(DateKey),
    BeginEdit,
    ChangeDraft(String),
    SaveMemo,
    DeleteMemo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: Option<DateKey>,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView {
    pub cell: CalendarCell,
    pub selected: bool,
    pub has_memo: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedView {
    pub date: DateKey,
    pub memo: Option<String>,
    pub draft: String,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub month: MonthIndex,
    pub days: Vec<DayView>,
    pub selection: Option<SelectedView>,
}

pub struct SelectionController {
    store: MemoStore,
    memos: MemoMap,
    state: SelectionState,
    displayed: MonthIndex,
    policy: NavigationPolicy,
}

impl SelectionController {
    /// Loads the persisted memos once; `store` is written after every
    /// change from then on.
    pub fn new(store: MemoStore, displayed: MonthIndex) -> Self {
        let memos = store.load();

        SelectionController {
            store,
            memos,
            state: SelectionState::default(),
            displayed,
            policy: NavigationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn memos(&self) -> &MemoMap {
        &self.memos
    }

    pub fn displayed(&self) -> MonthIndex {
        self.displayed
    }

    pub fn handle(&mut self, action: Action) -> Result<()> {
        log::debug!("Handling {:?}", action);

        match action {
            Action::NavigateMonth(direction) => {
                let target = match direction {
                    Direction::Prev => self.displayed.prev(),
                    Direction::Next => self.displayed.next(),
                };
                self.show_month(target);
                Ok(())
            }
            Action::GoToToday => {
                self.show_month(MonthIndex::from(DateKey::today()));
                Ok(())
            }
            Action::SelectDate(date) => {
                if self.state.selected == Some(date) {
                    self.clear_selection();
                } else {
                    self.state.selected = Some(date);
                    self.state.draft.clear();
                }
                Ok(())
            }
            Action::BeginEdit => {
                let date = self.require_selection("edit")?;
                let memo = self.memos.get(&date).ok_or_else(|| {
                    Error::new(ErrorKind::InvalidAction, &format!("no memo on {} to edit", date))
                })?;
                self.state.draft = memo.to_owned();
                Ok(())
            }
            Action::ChangeDraft(text) => {
                self.state.draft = text;
                Ok(())
            }
            Action::SaveMemo => {
                let date = self.require_selection("save")?;
                let next = if self.state.draft.is_empty() {
                    self.memos.delete(&date)
                } else {
                    self.memos.set(date, &self.state.draft)
                };
                self.commit(next)?;
                self.state.draft.clear();
                Ok(())
            }
            Action::DeleteMemo => {
                let date = self.require_selection("delete")?;
                if !self.memos.contains(&date) {
                    return Err(Error::new(
                        ErrorKind::InvalidAction,
                        &format!("no memo on {} to delete", date),
                    ));
                }
                let next = self.memos.delete(&date);
                self.commit(next)?;
                self.clear_selection();
                Ok(())
            }
        }
    }

    pub fn view(&self, today: DateKey) -> MonthView {
        let days = compute_grid(self.displayed)
            .into_iter()
            .map(|cell| DayView {
                cell,
                selected: self.state.selected == Some(cell.date()),
                has_memo: self.memos.contains(&cell.date()),
                is_today: cell.date() == today,
            })
            .collect();

        let selection = self.state.selected.map(|date| SelectedView {
            date,
            memo: self.memos.get(&date).map(str::to_owned),
            draft: self.state.draft.clone(),
        });

        MonthView {
            month: self.displayed,
            days,
            selection,
        }
    }

    fn show_month(&mut self, month: MonthIndex) {
        self.displayed = month;
        if self.policy == NavigationPolicy::ClearSelection {
            self.clear_selection();
        }
    }

    fn clear_selection(&mut self) {
        self.state.selected = None;
        self.state.draft.clear();
    }

    fn require_selection(&self, what: &str) -> Result<DateKey> {
        self.state.selected.ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidAction,
                &format!("cannot {} without a selected date", what),
            )
        })
    }

    // The snapshot only advances once it is persisted.
    fn commit(&mut self, next: MemoMap) -> Result<()> {
        if next.is_same_snapshot(&self.memos) {
            return Ok(());
        }

        self.store.save(&next)?;
        self.memos = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as CrateResult;
    use crate::memo::{KvStore, MemoryStore, MEMO_STORAGE_KEY};
    use chrono::Month;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn february() -> MonthIndex {
        MonthIndex::new(Month::February, 2024).unwrap()
    }

    fn controller() -> (SelectionController, MemoryStore) {
        let backend = MemoryStore::new();
        let store = MemoStore::new(Box::new(backend.clone()));
        (SelectionController::new(store, february()), backend)
    }

    struct FailingStore;

    impl KvStore for FailingStore {
        fn read(&self, _key: &str) -> CrateResult<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _key: &str, _value: &str) -> CrateResult<()> {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into())
        }
    }

    #[test]
    fn select_twice_toggles_off() {
        let (mut ctrl, _) = controller();

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        assert_eq!(ctrl.state().selected, Some(key("2024-02-14")));

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        assert_eq!(ctrl.state().selected, None);
    }

    #[test]
    fn selecting_other_date_clears_draft() {
        let (mut ctrl, _) = controller();

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("half written".to_owned())).unwrap();
        ctrl.handle(Action::SelectDate(key("2024-02-15"))).unwrap();

        assert_eq!(ctrl.state().selected, Some(key("2024-02-15")));
        assert!(ctrl.state().draft.is_empty());
    }

    #[test]
    fn save_and_delete_scenario() {
        let (mut ctrl, backend) = controller();

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("Dentist".to_owned())).unwrap();
        ctrl.handle(Action::SaveMemo).unwrap();

        assert_eq!(ctrl.memos().get(&key("2024-02-14")), Some("Dentist"));
        assert_eq!(ctrl.state().selected, Some(key("2024-02-14")));
        assert!(ctrl.state().draft.is_empty());

        let persisted = MemoStore::new(Box::new(backend.clone())).load();
        assert_eq!(persisted.get(&key("2024-02-14")), Some("Dentist"));

        ctrl.handle(Action::DeleteMemo).unwrap();

        assert!(!ctrl.memos().contains(&key("2024-02-14")));
        assert_eq!(ctrl.state().selected, None);
        assert!(ctrl.state().draft.is_empty());
        assert!(MemoStore::new(Box::new(backend)).load().is_empty());
    }

    #[test]
    fn begin_edit_loads_existing_memo() {
        let (mut ctrl, _) = controller();

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("Dentist".to_owned())).unwrap();
        ctrl.handle(Action::SaveMemo).unwrap();
        ctrl.handle(Action::BeginEdit).unwrap();

        assert_eq!(ctrl.state().draft, "Dentist");
    }

    #[test]
    fn preconditions_are_reported_and_leave_state_alone() {
        let (mut ctrl, backend) = controller();

        assert!(ctrl.handle(Action::SaveMemo).unwrap_err().is_invalid_action());
        assert!(ctrl.handle(Action::DeleteMemo).unwrap_err().is_invalid_action());
        assert!(ctrl.handle(Action::BeginEdit).unwrap_err().is_invalid_action());

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("draft".to_owned())).unwrap();
        assert!(ctrl.handle(Action::DeleteMemo).unwrap_err().is_invalid_action());
        assert!(ctrl.handle(Action::BeginEdit).unwrap_err().is_invalid_action());

        assert_eq!(ctrl.state().selected, Some(key("2024-02-14")));
        assert_eq!(ctrl.state().draft, "draft");
        assert!(backend.read(MEMO_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn saving_empty_draft_removes_memo() {
        let (mut ctrl, _) = controller();

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("Dentist".to_owned())).unwrap();
        ctrl.handle(Action::SaveMemo).unwrap();
        ctrl.handle(Action::ChangeDraft(String::new())).unwrap();
        ctrl.handle(Action::SaveMemo).unwrap();

        assert!(ctrl.memos().is_empty());
        assert_eq!(ctrl.state().selected, Some(key("2024-02-14")));
    }

    #[test]
    fn navigation_keeps_selection_by_default() {
        let (mut ctrl, _) = controller();

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("keep me".to_owned())).unwrap();
        ctrl.handle(Action::NavigateMonth(Direction::Next)).unwrap();

        assert_eq!(ctrl.displayed().month(), Month::March);
        assert_eq!(ctrl.state().selected, Some(key("2024-02-14")));
        assert_eq!(ctrl.state().draft, "keep me");

        ctrl.handle(Action::NavigateMonth(Direction::Prev)).unwrap();
        ctrl.handle(Action::NavigateMonth(Direction::Prev)).unwrap();
        assert_eq!(ctrl.displayed().month(), Month::January);
    }

    #[test]
    fn navigation_can_clear_selection() {
        let (ctrl, _) = controller();
        let mut ctrl = ctrl.with_policy(NavigationPolicy::ClearSelection);

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("gone".to_owned())).unwrap();
        ctrl.handle(Action::NavigateMonth(Direction::Prev)).unwrap();

        assert_eq!(ctrl.state(), &SelectionState::default());
    }

    #[test]
    fn failed_save_keeps_previous_snapshot() {
        let store = MemoStore::new(Box::new(FailingStore));
        let mut ctrl = SelectionController::new(store, february());

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("Dentist".to_owned())).unwrap();

        assert!(ctrl.handle(Action::SaveMemo).is_err());
        assert!(ctrl.memos().is_empty());
        assert_eq!(ctrl.state().draft, "Dentist");
    }

    #[test]
    fn memos_are_loaded_on_startup() {
        let backend =
            MemoryStore::new().with_entry(MEMO_STORAGE_KEY, "\"2024-02-14\" = \"Dentist\"\n");
        let ctrl = SelectionController::new(MemoStore::new(Box::new(backend)), february());

        assert_eq!(ctrl.memos().get(&key("2024-02-14")), Some("Dentist"));
    }

    #[test]
    fn view_marks_selection_memos_and_today() {
        let (mut ctrl, _) = controller();

        ctrl.handle(Action::SelectDate(key("2024-02-14"))).unwrap();
        ctrl.handle(Action::ChangeDraft("Dentist".to_owned())).unwrap();
        ctrl.handle(Action::SaveMemo).unwrap();

        let view = ctrl.view(key("2024-02-20"));
        assert_eq!(view.month, february());
        assert_eq!(view.days.len(), 35);

        let day = |d: &str| view.days.iter().find(|v| v.cell.date() == key(d)).unwrap();
        assert!(day("2024-02-14").selected && day("2024-02-14").has_memo);
        assert!(day("2024-02-20").is_today && !day("2024-02-20").has_memo);
        assert_eq!(view.days.iter().filter(|v| v.selected).count(), 1);

        let selection = view.selection.unwrap();
        assert_eq!(selection.memo.as_deref(), Some("Dentist"));
        assert!(selection.draft.is_empty());
    }
}
