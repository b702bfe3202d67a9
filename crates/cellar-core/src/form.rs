//! Form controller — the state of the edit form as a pure state machine.
//!
//! A [`FormState`] holds the text of each field plus the editing marker, the
//! id of the record currently loaded for update or delete. [`transition`]
//! maps a state and a [`FormAction`] to the next state and, for the write
//! actions, the [`WriteOp`] to hand to the store.
//!
//! Write actions leave the form untouched. The form is only reset by
//! [`FormAction::Committed`], which the caller dispatches after the store
//! reports that the write's transaction completed.

use crate::{
  id::IdGenerator,
  store::WriteOp,
  whiskey::{Whiskey, WhiskeyDraft, WhiskeyId},
};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The text inputs of the form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Name,
  Country,
  Age,
}

impl Field {
  pub const ALL: [Field; 3] = [Field::Name, Field::Country, Field::Age];

  pub fn label(self) -> &'static str {
    match self {
      Field::Name => "Name",
      Field::Country => "Country",
      Field::Age => "Age",
    }
  }
}

/// Raw field contents, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
  pub name:     String,
  pub country:  String,
  pub age:      String,
  pub is_owned: bool,
}

impl FormFields {
  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::Name => &self.name,
      Field::Country => &self.country,
      Field::Age => &self.age,
    }
  }

  fn get_mut(&mut self, field: Field) -> &mut String {
    match field {
      Field::Name => &mut self.name,
      Field::Country => &mut self.country,
      Field::Age => &mut self.age,
    }
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
  pub fields:  FormFields,
  /// Id of the record loaded for editing; `None` while composing a new one.
  pub editing: Option<WhiskeyId>,
}

impl FormState {
  /// Current field values, with surrounding whitespace trimmed.
  pub fn read_values(&self) -> WhiskeyDraft {
    WhiskeyDraft {
      name:     self.fields.name.trim().to_owned(),
      country:  self.fields.country.trim().to_owned(),
      age:      self.fields.age.trim().to_owned(),
      is_owned: self.fields.is_owned,
    }
  }

  /// A form showing `whiskey`, marked as editing it.
  pub fn populate(whiskey: &Whiskey) -> Self {
    Self {
      fields:  FormFields {
        name:     whiskey.name.clone(),
        country:  whiskey.country.clone(),
        age:      whiskey.age.clone(),
        is_owned: whiskey.is_owned,
      },
      editing: Some(whiskey.id.clone()),
    }
  }

  /// Empty fields and no editing marker.
  pub fn cleared() -> Self { Self::default() }

  pub fn is_editing(&self) -> bool { self.editing.is_some() }
}

// ─── Actions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
  /// Replace the text of one field.
  Edit(Field, String),
  ToggleOwned,
  /// Store the form contents as a new record.
  Add,
  /// Replace the record under the editing marker with the form contents.
  Update,
  /// Remove the record under the editing marker.
  Delete,
  /// Reset the form, discarding the editing marker.
  Clear,
  /// Load a stored record into the form.
  Select(Whiskey),
  /// The write issued by the previous action has committed.
  Committed,
}

/// Next form state plus the write to perform, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  pub state:   FormState,
  pub command: Option<WriteOp>,
}

impl Transition {
  fn stay(state: &FormState) -> Self { Self { state: state.clone(), command: None } }

  fn to(state: FormState) -> Self { Self { state, command: None } }

  fn write(state: &FormState, op: WriteOp) -> Self {
    Self { state: state.clone(), command: Some(op) }
  }
}

/// Compute the effect of `action` on `state`.
///
/// `Update` and `Delete` without an editing marker do nothing.
pub fn transition(state: &FormState, action: FormAction, ids: &dyn IdGenerator) -> Transition {
  match action {
    FormAction::Edit(field, text) => {
      let mut next = state.clone();
      *next.fields.get_mut(field) = text;
      Transition::to(next)
    }
    FormAction::ToggleOwned => {
      let mut next = state.clone();
      next.fields.is_owned = !next.fields.is_owned;
      Transition::to(next)
    }
    FormAction::Add => {
      let whiskey = state.read_values().into_whiskey(ids.next_id());
      Transition::write(state, WriteOp::Add(whiskey))
    }
    FormAction::Update => match &state.editing {
      Some(id) => {
        let whiskey = state.read_values().into_whiskey(id.clone());
        Transition::write(state, WriteOp::Put(whiskey))
      }
      None => Transition::stay(state),
    },
    FormAction::Delete => match &state.editing {
      Some(id) => Transition::write(state, WriteOp::Delete(id.clone())),
      None => Transition::stay(state),
    },
    FormAction::Clear | FormAction::Committed => Transition::to(FormState::cleared()),
    FormAction::Select(whiskey) => Transition::to(FormState::populate(&whiskey)),
  }
}
