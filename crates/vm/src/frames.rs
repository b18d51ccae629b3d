//! The frame store: global, local, and temporary frames plus the
//! internal stack of saved local frames.
//!
//! The three frames have independent lifecycles. The global frame lives
//! for the whole run. The temporary frame exists only between
//! CREATEFRAME and the next PUSHFRAME. The local frame exists only while
//! a scope is active; PUSHFRAME/POPFRAME move whole frames between the
//! local slot, the temporary slot, and the saved stack. None of this is
//! coupled to the call-return stack.

use framecode_common::{FrameKind, Value};

use crate::error::RuntimeError;

/// A single named storage cell. The value is absent until first
/// assignment; reading it before then is an error distinct from reading
/// an undefined name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    name: String,
    value: Option<Value>,
}

/// An ordered collection of variable slots with unique names.
///
/// Slots keep definition order so the BREAK dump is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    slots: Vec<Slot>,
}

impl Frame {
    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }
}

/// The complete variable memory of one running program.
#[derive(Debug, Default)]
pub struct FrameStore {
    global: Frame,
    local: Option<Frame>,
    temp: Option<Frame>,
    /// Saved local frames, pushed by PUSHFRAME. An entry may be "none"
    /// when no local frame was active at push time.
    saved: Vec<Option<Frame>>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self
                .local
                .as_ref()
                .ok_or(RuntimeError::FrameMissing { frame: kind }),
            FrameKind::Temporary => self
                .temp
                .as_ref()
                .ok_or(RuntimeError::FrameMissing { frame: kind }),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self
                .local
                .as_mut()
                .ok_or(RuntimeError::FrameMissing { frame: kind }),
            FrameKind::Temporary => self
                .temp
                .as_mut()
                .ok_or(RuntimeError::FrameMissing { frame: kind }),
        }
    }

    /// Create an empty, valueless slot. Fails on an absent frame and on
    /// redefinition.
    pub fn define(&mut self, kind: FrameKind, name: &str) -> Result<(), RuntimeError> {
        let frame = self.frame_mut(kind)?;
        if frame.slot(name).is_some() {
            return Err(RuntimeError::Redefinition { name: name.into() });
        }
        frame.slots.push(Slot {
            name: name.into(),
            value: None,
        });
        Ok(())
    }

    /// Overwrite the slot's value (and thereby its type).
    pub fn write(&mut self, kind: FrameKind, name: &str, value: Value) -> Result<(), RuntimeError> {
        let frame = self.frame_mut(kind)?;
        let slot = frame
            .slot_mut(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                frame: kind,
                name: name.into(),
            })?;
        slot.value = Some(value);
        Ok(())
    }

    /// Read the slot's value; an unwritten slot is an error.
    pub fn read(&self, kind: FrameKind, name: &str) -> Result<Value, RuntimeError> {
        self.peek(kind, name)?
            .ok_or_else(|| RuntimeError::UninitializedValue {
                frame: kind,
                name: name.into(),
            })
    }

    /// Like [`read`](Self::read) but an unwritten slot yields `None`
    /// instead of an error. TYPE uses this to report the empty string.
    pub fn peek(&self, kind: FrameKind, name: &str) -> Result<Option<Value>, RuntimeError> {
        let frame = self.frame(kind)?;
        let slot = frame
            .slot(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                frame: kind,
                name: name.into(),
            })?;
        Ok(slot.value.clone())
    }

    /// CREATEFRAME: discard any existing temporary frame and start fresh.
    pub fn create_temp(&mut self) {
        self.temp = Some(Frame::default());
    }

    /// PUSHFRAME: the temporary frame becomes the local frame; the
    /// previous local frame (possibly "none") is saved.
    pub fn push_scope(&mut self) -> Result<(), RuntimeError> {
        let temp = self.temp.take().ok_or(RuntimeError::FrameMissing {
            frame: FrameKind::Temporary,
        })?;
        self.saved.push(self.local.take());
        self.local = Some(temp);
        Ok(())
    }

    /// POPFRAME: the local frame becomes the temporary frame; the most
    /// recently saved frame is restored as local. Both failure checks
    /// happen before any state changes.
    pub fn pop_scope(&mut self) -> Result<(), RuntimeError> {
        if self.local.is_none() {
            return Err(RuntimeError::FrameMissing {
                frame: FrameKind::Local,
            });
        }
        let restored = self.saved.pop().ok_or(RuntimeError::EmptyFrameStack)?;
        self.temp = self.local.take();
        self.local = restored;
        Ok(())
    }

    /// Global-frame slots in definition order, for the BREAK dump.
    pub fn global_slots(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.global
            .slots
            .iter()
            .map(|s| (s.name.as_str(), s.value.as_ref()))
    }
}
