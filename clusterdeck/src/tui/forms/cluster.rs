//! Cluster register/edit form: focus handling on top of the form controller

use clusterdeck_core::form::{ClusterFormController, EntryId, FieldPath, FormMode, KubeconfigCheck};
use clusterdeck_core::types::{ClusterDetail, SyncMode, TaintEffect};
use clusterdeck_core::{ClusterDeckError, ClusterDeckResult};

/// A register or edit dialog: the form controller plus keyboard focus
///
/// The controller owns every value, error and the submitting flag; this type
/// only adds what the terminal needs on top of it: which field has focus and
/// the local path typed in for `Ctrl-O`. Focus moves over
/// [`ClusterForm::editable_fields`], so read-only fields in edit mode are
/// shown but never focused.
///
/// # Examples
///
/// ```
/// use clusterdeck::tui::forms::{ClusterForm, ClusterFormField};
///
/// let mut form = ClusterForm::create();
/// assert_eq!(form.current_field, ClusterFormField::Name);
/// for c in "demo".chars() {
///     form.insert_char(c).unwrap();
/// }
/// assert_eq!(form.controller.state().cluster_name, "demo");
///
/// form.add_label();
/// assert!(matches!(form.current_field, ClusterFormField::LabelKey(_)));
/// ```
#[derive(Debug)]
pub struct ClusterForm {
    pub controller: ClusterFormController,
    /// Local file to read the kubeconfig from (`Ctrl-O`)
    pub kubeconfig_path: String,
    pub current_field: ClusterFormField,
}

/// One focusable input of a [`ClusterForm`]
///
/// Row fields carry the row's [`EntryId`], so focus stays on the same row
/// when a sibling above it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterFormField {
    Name,
    SyncMode,
    KubeconfigPath,
    Kubeconfig,
    LabelKey(EntryId),
    LabelValue(EntryId),
    TaintKey(EntryId),
    TaintValue(EntryId),
    TaintEffect(EntryId),
}

impl ClusterFormField {
    /// Controller path carrying this field's value and errors
    pub fn path(&self) -> Option<FieldPath> {
        match *self {
            ClusterFormField::Name => Some(FieldPath::ClusterName),
            ClusterFormField::SyncMode => Some(FieldPath::SyncMode),
            ClusterFormField::KubeconfigPath => None,
            ClusterFormField::Kubeconfig => Some(FieldPath::Kubeconfig),
            ClusterFormField::LabelKey(id) => Some(FieldPath::LabelKey(id)),
            ClusterFormField::LabelValue(id) => Some(FieldPath::LabelValue(id)),
            ClusterFormField::TaintKey(id) => Some(FieldPath::TaintKey(id)),
            ClusterFormField::TaintValue(id) => Some(FieldPath::TaintValue(id)),
            ClusterFormField::TaintEffect(id) => Some(FieldPath::TaintEffect(id)),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ClusterFormField::Name => "Cluster name",
            ClusterFormField::SyncMode => "Sync mode",
            ClusterFormField::KubeconfigPath => "Kubeconfig file",
            ClusterFormField::Kubeconfig => "Kubeconfig",
            ClusterFormField::LabelKey(_) => "Label key",
            ClusterFormField::LabelValue(_) => "Label value",
            ClusterFormField::TaintKey(_) => "Taint key",
            ClusterFormField::TaintValue(_) => "Taint value",
            ClusterFormField::TaintEffect(_) => "Taint effect",
        }
    }
}

impl ClusterForm {
    pub fn create() -> Self {
        Self::from_controller(ClusterFormController::create())
    }

    pub fn edit(detail: &ClusterDetail) -> Self {
        Self::from_controller(ClusterFormController::edit(detail))
    }

    /// Apply a named check to kubeconfig content loaded into this form
    pub fn with_kubeconfig_check(mut self, check: KubeconfigCheck) -> Self {
        self.controller = self.controller.with_kubeconfig_check(check);
        self
    }

    fn from_controller(controller: ClusterFormController) -> Self {
        let mut form = Self {
            controller,
            kubeconfig_path: String::new(),
            current_field: ClusterFormField::Name,
        };
        form.current_field = form.first_editable();
        form
    }

    pub fn mode(&self) -> FormMode {
        self.controller.mode()
    }

    /// Rendered fields in display (and focus) order
    pub fn fields(&self) -> Vec<ClusterFormField> {
        let mut fields = vec![ClusterFormField::Name, ClusterFormField::SyncMode];
        if self.controller.shows_kubeconfig() {
            fields.push(ClusterFormField::KubeconfigPath);
            fields.push(ClusterFormField::Kubeconfig);
        }
        if self.controller.show_advanced() {
            for id in self.controller.state().labels.ids() {
                fields.push(ClusterFormField::LabelKey(id));
                fields.push(ClusterFormField::LabelValue(id));
            }
            for id in self.controller.state().taints.ids() {
                fields.push(ClusterFormField::TaintKey(id));
                fields.push(ClusterFormField::TaintValue(id));
                fields.push(ClusterFormField::TaintEffect(id));
            }
        }
        fields
    }

    /// Fields that take input; read-only fields are skipped by Tab
    pub fn editable_fields(&self) -> Vec<ClusterFormField> {
        self.fields()
            .into_iter()
            .filter(|field| !self.is_read_only(*field))
            .collect()
    }

    pub fn is_read_only(&self, field: ClusterFormField) -> bool {
        field
            .path()
            .map(|path| self.controller.is_read_only(path))
            .unwrap_or(false)
    }

    fn first_editable(&self) -> ClusterFormField {
        self.editable_fields()
            .first()
            .copied()
            .unwrap_or(ClusterFormField::Name)
    }

    pub fn next_field(&mut self) {
        self.step_focus(1);
    }

    pub fn previous_field(&mut self) {
        self.step_focus(-1);
    }

    fn step_focus(&mut self, delta: isize) {
        let fields = self.editable_fields();
        if fields.is_empty() {
            return;
        }
        let len = fields.len() as isize;
        self.current_field = match fields.iter().position(|f| *f == self.current_field) {
            Some(index) => fields[(index as isize + delta).rem_euclid(len) as usize],
            None => fields[0],
        };
    }

    /// Value shown for `field`
    pub fn value(&self, field: ClusterFormField) -> String {
        let state = self.controller.state();
        match field {
            ClusterFormField::Name => state.cluster_name.clone(),
            ClusterFormField::SyncMode => state
                .sync_mode
                .map(|m| m.to_string())
                .unwrap_or_default(),
            ClusterFormField::KubeconfigPath => self.kubeconfig_path.clone(),
            ClusterFormField::Kubeconfig => state.kubeconfig.clone(),
            ClusterFormField::LabelKey(id) => {
                state.labels.get(id).map(|l| l.key.clone()).unwrap_or_default()
            }
            ClusterFormField::LabelValue(id) => {
                state.labels.get(id).map(|l| l.value.clone()).unwrap_or_default()
            }
            ClusterFormField::TaintKey(id) => {
                state.taints.get(id).map(|t| t.key.clone()).unwrap_or_default()
            }
            ClusterFormField::TaintValue(id) => {
                state.taints.get(id).map(|t| t.value.clone()).unwrap_or_default()
            }
            ClusterFormField::TaintEffect(id) => state
                .taints
                .get(id)
                .and_then(|t| t.effect)
                .map(|e| e.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn insert_char(&mut self, c: char) -> ClusterDeckResult<()> {
        let mut text = self.value(self.current_field);
        text.push(c);
        self.set_text(text)
    }

    pub fn backspace(&mut self) -> ClusterDeckResult<()> {
        let mut text = self.value(self.current_field);
        if text.pop().is_none() {
            return Ok(());
        }
        self.set_text(text)
    }

    fn set_text(&mut self, text: String) -> ClusterDeckResult<()> {
        match self.current_field {
            ClusterFormField::Name => self.controller.set_cluster_name(text),
            ClusterFormField::KubeconfigPath => {
                self.kubeconfig_path = text;
                Ok(())
            }
            ClusterFormField::Kubeconfig => self.controller.set_kubeconfig(text),
            ClusterFormField::LabelKey(id) => self.controller.set_label_key(id, text),
            ClusterFormField::LabelValue(id) => self.controller.set_label_value(id, text),
            ClusterFormField::TaintKey(id) => self.controller.set_taint_key(id, text),
            ClusterFormField::TaintValue(id) => self.controller.set_taint_value(id, text),
            ClusterFormField::SyncMode | ClusterFormField::TaintEffect(_) => {
                Err(ClusterDeckError::invalid_input(
                    self.current_field.title(),
                    "use ←/→ to choose a value",
                ))
            }
        }
    }

    /// Cycle the focused choice field; no-op on text fields
    pub fn cycle(&mut self, forward: bool) -> ClusterDeckResult<()> {
        match self.current_field {
            ClusterFormField::SyncMode => {
                let next = match self.controller.state().sync_mode {
                    Some(mode) => mode.toggled(),
                    None => SyncMode::Push,
                };
                self.controller.set_sync_mode(next)
            }
            ClusterFormField::TaintEffect(id) => {
                let current = self.controller.state().taints.get(id).and_then(|t| t.effect);
                let next = match (current, forward) {
                    (Some(effect), true) => effect.next(),
                    (Some(effect), false) => effect.previous(),
                    (None, _) => TaintEffect::NoSchedule,
                };
                self.controller.set_taint_effect(id, next)
            }
            _ => Ok(()),
        }
    }

    pub fn add_label(&mut self) {
        let id = self.controller.add_label();
        self.controller.set_advanced(true);
        self.current_field = ClusterFormField::LabelKey(id);
    }

    pub fn add_taint(&mut self) {
        let id = self.controller.add_taint();
        self.controller.set_advanced(true);
        self.current_field = ClusterFormField::TaintKey(id);
    }

    /// Remove the label or taint row holding focus
    ///
    /// Returns `false` when focus is not on a row.
    pub fn remove_focused_row(&mut self) -> ClusterDeckResult<bool> {
        let fields = self.editable_fields();
        let index = fields
            .iter()
            .position(|f| *f == self.current_field)
            .unwrap_or(0);
        match self.current_field {
            ClusterFormField::LabelKey(id) | ClusterFormField::LabelValue(id) => {
                self.controller.remove_label_entry(id)?;
            }
            ClusterFormField::TaintKey(id)
            | ClusterFormField::TaintValue(id)
            | ClusterFormField::TaintEffect(id) => {
                self.controller.remove_taint_entry(id)?;
            }
            _ => return Ok(false),
        }
        // Land on whatever now precedes the removed row
        let remaining = self.editable_fields();
        self.current_field = fields[..index]
            .iter()
            .rev()
            .find(|f| remaining.contains(*f))
            .copied()
            .unwrap_or_else(|| self.first_editable());
        Ok(true)
    }

    pub fn toggle_advanced(&mut self) -> bool {
        let visible = self.controller.toggle_advanced();
        if !self.editable_fields().contains(&self.current_field) {
            self.current_field = self.first_editable();
        }
        visible
    }

    /// Reset everything, including the local path field
    pub fn cancel(&mut self) {
        self.controller.cancel();
        self.kubeconfig_path.clear();
        self.current_field = self.first_editable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterdeck_core::types::ObjectMeta;
    use std::collections::BTreeMap;

    fn detail() -> ClusterDetail {
        let mut labels = BTreeMap::new();
        labels.insert("env".to_string(), "prod".to_string());
        ClusterDetail {
            object_meta: ObjectMeta {
                name: "member1".to_string(),
                labels,
                creation_timestamp: None,
            },
            sync_mode: SyncMode::Pull,
            taints: Vec::new(),
        }
    }

    #[test]
    fn test_create_focus_order() {
        let mut form = ClusterForm::create();
        assert_eq!(form.current_field, ClusterFormField::Name);
        form.next_field();
        assert_eq!(form.current_field, ClusterFormField::SyncMode);
        form.next_field();
        form.next_field();
        assert_eq!(form.current_field, ClusterFormField::Kubeconfig);
        form.next_field();
        assert_eq!(form.current_field, ClusterFormField::Name);
        form.previous_field();
        assert_eq!(form.current_field, ClusterFormField::Kubeconfig);
    }

    #[test]
    fn test_edit_skips_read_only_fields() {
        let form = ClusterForm::edit(&detail());
        assert!(matches!(form.current_field, ClusterFormField::LabelKey(_)));
        assert!(!form.fields().contains(&ClusterFormField::Kubeconfig));
        assert!(form.fields().contains(&ClusterFormField::Name));
        assert!(!form.editable_fields().contains(&ClusterFormField::SyncMode));
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut form = ClusterForm::create();
        for c in "demo".chars() {
            form.insert_char(c).unwrap();
        }
        form.backspace().unwrap();
        assert_eq!(form.controller.state().cluster_name, "dem");
    }

    #[test]
    fn test_cycle_choices() {
        let mut form = ClusterForm::create();
        form.current_field = ClusterFormField::SyncMode;
        form.cycle(true).unwrap();
        assert_eq!(form.controller.state().sync_mode, Some(SyncMode::Push));
        form.cycle(true).unwrap();
        assert_eq!(form.controller.state().sync_mode, Some(SyncMode::Pull));
        assert!(form.insert_char('x').is_err());

        form.add_taint();
        form.next_field();
        form.next_field();
        form.cycle(true).unwrap();
        assert_eq!(form.value(form.current_field), "NoSchedule");
    }

    #[test]
    fn test_remove_focused_row_moves_focus_back() {
        let mut form = ClusterForm::create();
        form.add_label();
        let first = form.current_field;
        form.add_label();
        form.next_field();

        assert!(form.remove_focused_row().unwrap());

        assert_eq!(form.controller.state().labels.len(), 1);
        assert_eq!(form.current_field, ClusterFormField::LabelValue(match first {
            ClusterFormField::LabelKey(id) => id,
            _ => unreachable!(),
        }));
    }

    #[test]
    fn test_remove_without_row_focus_is_noop() {
        let mut form = ClusterForm::create();
        assert!(!form.remove_focused_row().unwrap());
    }
}
