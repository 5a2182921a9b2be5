//! Enhancement triplet list and its derived state
//!
//! The list is split into blocks of 13 triplets, one block per X/26
//! designation code. After every edit the derived state of every triplet
//! is recomputed in list order:
//!
//! 1. Level 2.5 and above: active position tracking, error and reserved
//!    field classification, and self-stamping of object definitions with
//!    their own list position.
//! 2. Level 1.5: a simpler active position walk that stops at the first
//!    termination marker.
//!
//! Inserting or removing triplets shifts every local object pointer that
//! refers past the edit, so invocations keep referring to the same definition.
//! Pointers that already run past the end of the list are left alone.

use crate::constants::{MAX_TRIPLETS, TRIPLETS_PER_PACKET};
use crate::error::CodecError;
use crate::triplet::{mode, ObjectSource, Triplet};
use crate::Result;
use alloc::vec::Vec;
use core::ops::Range;

#[cfg(feature = "logging")]
use tracing::trace;

/// Row and column the active position has reached, `None` while undetermined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Active row
    pub row: Option<u8>,
    /// Active column
    pub column: Option<u8>,
}

impl Position {
    /// Whether a row has been set
    pub const fn is_deployed(&self) -> bool {
        self.row.is_some()
    }

    /// Move to `row`. Moving up is refused; moving down clears the column.
    fn set_row(&mut self, row: u8) -> bool {
        match self.row {
            Some(current) if row < current => false,
            Some(current) if row == current => true,
            _ => {
                self.row = Some(row);
                self.column = None;
                true
            }
        }
    }

    /// Move to `column` on the current row. Moving left is refused.
    fn set_column(&mut self, column: u8) -> bool {
        if matches!(self.column, Some(current) if column < current) {
            return false;
        }
        if self.row.is_none() {
            self.row = Some(0);
        }
        self.column = Some(column);
        true
    }

    fn reset(&mut self) {
        *self = Position::default();
    }
}

/// Problems found while walking the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripletError {
    /// Row is above the current active row
    ActivePositionMovedUp,
    /// Column is left of the current active column
    ActivePositionMovedLeft,
    /// Full screen colour after the active position was deployed
    FullScreenColourAfterActivePosition,
    /// Origin modifier not followed by an object invocation
    OriginModifierAlone,
    /// Local object pointer is past the end of the list or names triplet 13-15
    InvokePointerInvalid,
    /// Local object pointer does not reference an object definition
    InvokeTargetNotDefinition,
    /// Invoked and defined object types differ
    InvokeTypeMismatch,
}

/// State derived from a triplet's place in the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripletState {
    /// Active position after this triplet on a level 2.5 or 3.5 decoder
    pub active_position: Position,
    /// Active position after this triplet on a level 1.5 decoder
    pub active_position_1p5: Position,
    /// Error found at this triplet
    pub error: Option<TripletError>,
    /// Mode is reserved
    pub reserved_mode: bool,
    /// Data or address holds a reserved value
    pub reserved_data: bool,
}

/// Description of an edit, for hosts that track undo or refresh views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEdit {
    /// List positions inserted, removed or replaced
    pub range: Range<usize>,
    /// Shift applied to local object pointers past the edit
    pub shift: isize,
}

/// Ordered enhancement triplets of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripletList {
    triplets: Vec<Triplet>,
    states: Vec<TripletState>,
}

impl TripletList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from triplets, keeping any local object pointers as given
    pub fn from_triplets(triplets: Vec<Triplet>) -> Result<Self> {
        if triplets.len() > MAX_TRIPLETS {
            return Err(CodecError::TripletListFull {
                capacity: MAX_TRIPLETS,
            });
        }
        let mut list = Self {
            triplets,
            states: Vec::new(),
        };
        list.recompute();
        Ok(list)
    }

    /// Number of triplets
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Triplet at `index`
    pub fn get(&self, index: usize) -> Option<&Triplet> {
        self.triplets.get(index)
    }

    /// Derived state of the triplet at `index`
    pub fn state(&self, index: usize) -> Option<&TripletState> {
        self.states.get(index)
    }

    /// All triplets in order
    pub fn triplets(&self) -> &[Triplet] {
        &self.triplets
    }

    /// Triplets paired with their derived state
    pub fn iter(&self) -> impl Iterator<Item = (&Triplet, &TripletState)> {
        self.triplets.iter().zip(self.states.iter())
    }

    /// Number of triplets that carry an error
    pub fn error_count(&self) -> usize {
        self.states.iter().filter(|s| s.error.is_some()).count()
    }

    /// Append a triplet at the end
    pub fn append(&mut self, triplet: Triplet) -> Result<ListEdit> {
        self.insert(self.triplets.len(), triplet)
    }

    /// Insert a triplet at `index`
    pub fn insert(&mut self, index: usize, triplet: Triplet) -> Result<ListEdit> {
        self.insert_slice(index, &[triplet])
    }

    /// Insert several triplets at `index`
    pub fn insert_slice(&mut self, index: usize, triplets: &[Triplet]) -> Result<ListEdit> {
        if index > self.triplets.len() {
            return Err(CodecError::IndexOutOfRange {
                index,
                len: self.triplets.len(),
            });
        }
        if self.triplets.len() + triplets.len() > MAX_TRIPLETS {
            return Err(CodecError::TripletListFull {
                capacity: MAX_TRIPLETS,
            });
        }

        let count = triplets.len();
        self.shift_local_references(index..self.triplets.len(), count as isize);
        self.triplets
            .splice(index..index, triplets.iter().copied());
        self.recompute();

        Ok(ListEdit {
            range: index..index + count,
            shift: count as isize,
        })
    }

    /// Remove the triplet at `index`
    pub fn remove(&mut self, index: usize) -> Result<ListEdit> {
        self.remove_range(index..index + 1)
    }

    /// Remove the triplets in `range`
    ///
    /// Pointers into the removed range are left as they are and show up as
    /// invalid after recomputation.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<ListEdit> {
        if range.start > range.end || range.end > self.triplets.len() {
            return Err(CodecError::IndexOutOfRange {
                index: range.end,
                len: self.triplets.len(),
            });
        }

        let count = range.len();
        let len = self.triplets.len();
        self.triplets.drain(range.clone());
        self.shift_local_references(range.end..len, -(count as isize));
        self.recompute();

        Ok(ListEdit {
            range,
            shift: -(count as isize),
        })
    }

    /// Replace the triplet at `index`
    pub fn replace(&mut self, index: usize, triplet: Triplet) -> Result<ListEdit> {
        let len = self.triplets.len();
        let slot = self
            .triplets
            .get_mut(index)
            .ok_or(CodecError::IndexOutOfRange { index, len })?;
        *slot = triplet;
        self.recompute();

        Ok(ListEdit {
            range: index..index + 1,
            shift: 0,
        })
    }

    /// Remove every triplet
    pub fn clear(&mut self) -> ListEdit {
        let range = 0..self.triplets.len();
        self.triplets.clear();
        self.states.clear();
        ListEdit {
            shift: -(range.len() as isize),
            range,
        }
    }

    /// The 13 triplets of designation code `code`, padded with [`Triplet::NO_OP`]
    ///
    /// Returns `None` when the list does not reach into that block, so the
    /// first triplet of a returned block always belongs to the list.
    pub fn block(&self, code: u8) -> Option<[Triplet; TRIPLETS_PER_PACKET]> {
        let start = code as usize * TRIPLETS_PER_PACKET;
        if start >= self.triplets.len() {
            return None;
        }
        let mut block = [Triplet::NO_OP; TRIPLETS_PER_PACKET];
        for (slot, triplet) in block.iter_mut().zip(self.triplets[start..].iter()) {
            *slot = *triplet;
        }
        Some(block)
    }

    /// Overwrite the 13 triplets of designation code `code`
    ///
    /// Gaps before the block are filled with [`Triplet::NO_OP`]. Pointers are
    /// taken as stored, since the block arrives from a packet.
    pub fn set_block(&mut self, code: u8, block: &[Triplet; TRIPLETS_PER_PACKET]) -> Result<()> {
        let start = code as usize * TRIPLETS_PER_PACKET;
        if start + TRIPLETS_PER_PACKET > MAX_TRIPLETS {
            return Err(CodecError::InvalidDesignationCode { packet: 26, code });
        }
        if self.triplets.len() < start + TRIPLETS_PER_PACKET {
            self.triplets
                .resize(start + TRIPLETS_PER_PACKET, Triplet::NO_OP);
        }
        self.triplets[start..start + TRIPLETS_PER_PACKET].copy_from_slice(block);
        self.recompute();
        Ok(())
    }

    /// Drop the [`Triplet::NO_OP`] run that pads the last X/26 packet
    ///
    /// Only the tail of the last block is touched and its first triplet is
    /// kept. No-op triplets that really ended the list are dropped with the
    /// padding, which leaves the saved packets unchanged.
    pub fn drop_padding(&mut self) {
        let before = self.triplets.len();
        if before == 0 {
            return;
        }
        let keep = (before - 1) / TRIPLETS_PER_PACKET * TRIPLETS_PER_PACKET + 1;
        while self.triplets.len() > keep && self.triplets.last() == Some(&Triplet::NO_OP) {
            self.triplets.pop();
        }
        if self.triplets.len() != before {
            self.recompute();
        }
    }

    /// Shift local object pointers that refer into `targets` by `delta`
    fn shift_local_references(&mut self, targets: Range<usize>, delta: isize) {
        if delta == 0 || targets.is_empty() {
            return;
        }
        for triplet in self.triplets.iter_mut() {
            if !triplet.is_invocation() || triplet.object_source() != ObjectSource::Local {
                continue;
            }
            let target = triplet.object_local_index();
            if targets.contains(&target) {
                let shifted = target as isize + delta;
                if (0..MAX_TRIPLETS as isize).contains(&shifted) {
                    triplet.set_object_local_index(shifted as usize);
                }
            }
        }
    }

    /// Recompute the derived state of every triplet
    fn recompute(&mut self) {
        self.states.clear();
        self.states
            .resize(self.triplets.len(), TripletState::default());

        self.walk_level_2p5();
        self.walk_level_1p5();

        #[cfg(feature = "logging")]
        trace!(
            "Recomputed {} triplets, {} with errors",
            self.triplets.len(),
            self.error_count()
        );
    }

    fn walk_level_2p5(&mut self) {
        let mut position = Position::default();
        let len = self.triplets.len();

        for i in 0..len {
            let triplet = self.triplets[i];
            let mut state = TripletState::default();

            if triplet.is_row_triplet() {
                match triplet.mode_ext() {
                    mode::FULL_SCREEN_COLOUR => {
                        if position.is_deployed() {
                            state.error = Some(TripletError::FullScreenColourAfterActivePosition);
                        }
                        if triplet.data() & 0x60 != 0 {
                            state.reserved_data = true;
                        }
                    }
                    mode::FULL_ROW_COLOUR => {
                        if !position.set_row(triplet.address_row()) {
                            state.error = Some(TripletError::ActivePositionMovedUp);
                        }
                        if !matches!(triplet.data() & 0x60, 0x00 | 0x60) {
                            state.reserved_data = true;
                        }
                    }
                    mode::SET_ACTIVE_POSITION => {
                        if !position.set_row(triplet.address_row()) {
                            state.error = Some(TripletError::ActivePositionMovedUp);
                        } else if triplet.data() >= 40 {
                            state.reserved_data = true;
                        } else if !position.set_column(triplet.data()) {
                            state.error = Some(TripletError::ActivePositionMovedLeft);
                        }
                    }
                    mode::ADDRESS_ROW_0 => {
                        if triplet.address() != 63 {
                            state.reserved_data = true;
                        }
                        if !position.set_row(0) {
                            state.error = Some(TripletError::ActivePositionMovedUp);
                        }
                        if !matches!(triplet.data() & 0x60, 0x00 | 0x60) {
                            state.reserved_data = true;
                        }
                    }
                    mode::PDC_COUNTRY_OF_ORIGIN..=mode::PDC_SERIES => {}
                    mode::ORIGIN_MODIFIER => {
                        let followed_by_invocation = self
                            .triplets
                            .get(i + 1)
                            .map_or(false, Triplet::is_invocation);
                        if !followed_by_invocation {
                            state.error = Some(TripletError::OriginModifierAlone);
                        }
                    }
                    mode::INVOKE_ACTIVE_OBJECT..=mode::INVOKE_PASSIVE_OBJECT => {
                        if triplet.object_source() == ObjectSource::Local {
                            state.error = self.check_invocation(&triplet);
                        }
                    }
                    mode::DEFINE_ACTIVE_OBJECT..=mode::DEFINE_PASSIVE_OBJECT => {
                        // Objects are positioned independently of the page
                        position.reset();
                        self.triplets[i].set_object_local_index(i);
                    }
                    mode::DRCS_MODE => {
                        if triplet.data() & 0x30 == 0 {
                            state.reserved_data = true;
                        }
                    }
                    mode::TERMINATION_MARKER => {}
                    _ => state.reserved_mode = true,
                }
            } else {
                match triplet.mode_ext() {
                    0x24 | 0x25 | 0x2A => state.reserved_mode = true,
                    mode::PDC_COLUMN => {}
                    _ => {
                        if !position.set_column(triplet.address_column()) {
                            state.error = Some(TripletError::ActivePositionMovedLeft);
                        }
                    }
                }

                match triplet.mode_ext() {
                    mode::FOREGROUND_COLOUR | mode::BACKGROUND_COLOUR => {
                        if triplet.data() & 0x60 != 0 {
                            state.reserved_data = true;
                        }
                    }
                    mode::G1_CHARACTER
                    | mode::G3_CHARACTER_L1_5
                    | mode::G0_CHARACTER_L2_5
                    | mode::G3_CHARACTER_L2_5
                    | mode::G2_CHARACTER
                    | mode::G0_DIACRITICAL_FIRST..=mode::G0_DIACRITICAL_LAST => {
                        if triplet.data() < 0x20 {
                            state.reserved_data = true;
                        }
                    }
                    mode::DRCS_CHARACTER => {
                        if triplet.data() & 0x3F >= 48 {
                            state.reserved_data = true;
                        }
                    }
                    _ => {}
                }
            }

            state.active_position = position;
            self.states[i] = state;
        }
    }

    fn check_invocation(&self, triplet: &Triplet) -> Option<TripletError> {
        let target_index = triplet.object_local_index();
        if triplet.object_local_triplet_number() > 12 {
            return Some(TripletError::InvokePointerInvalid);
        }
        let target = match self.triplets.get(target_index) {
            Some(target) => target,
            None => return Some(TripletError::InvokePointerInvalid),
        };
        if !target.is_definition() {
            return Some(TripletError::InvokeTargetNotDefinition);
        }
        if triplet.mode_ext() | 0x04 != target.mode_ext() {
            return Some(TripletError::InvokeTypeMismatch);
        }
        None
    }

    fn walk_level_1p5(&mut self) {
        let mut position = Position::default();

        for (triplet, state) in self.triplets.iter().zip(self.states.iter_mut()) {
            match triplet.mode_ext() {
                mode::TERMINATION_MARKER => break,
                mode::SET_ACTIVE_POSITION => {
                    position.set_row(triplet.address_row());
                }
                mode::ADDRESS_ROW_0 => {
                    if triplet.address() == 63 {
                        position.set_row(0);
                    }
                }
                mode::G3_CHARACTER_L1_5
                | mode::G2_CHARACTER
                | mode::G0_DIACRITICAL_FIRST..=mode::G0_DIACRITICAL_LAST => {
                    position.set_column(triplet.address_column());
                }
                _ => {}
            }
            state.active_position_1p5 = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Rows 1-23 use addresses 41-63 and row 24 uses 40; row 0 has no address
    fn set_active_position(row: u8, column: u8) -> Triplet {
        assert!((1..=24).contains(&row), "row {} has no row address", row);
        let address = if row == 24 { 40 } else { 40 + row };
        let triplet = Triplet::new(address, mode::SET_ACTIVE_POSITION, column);
        assert_eq!(triplet.address_row(), row);
        triplet
    }

    fn define(index_hint: u8) -> Triplet {
        // Level bits 0x08 (level 2.5), pointer stamped on recompute
        Triplet::new(0x28, mode::DEFINE_ACTIVE_OBJECT, index_hint)
    }

    fn invoke(target: usize) -> Triplet {
        let mut triplet = Triplet::new(0x28, mode::INVOKE_ACTIVE_OBJECT, 0);
        triplet.set_object_local_index(target);
        triplet
    }

    #[test]
    fn test_active_position_tracking() {
        let list = TripletList::from_triplets(vec![
            set_active_position(5, 10),
            Triplet::new(12, 0x09, b'A'),
        ])
        .unwrap();
        let state = list.state(1).unwrap();
        assert_eq!(state.active_position.row, Some(5));
        assert_eq!(state.active_position.column, Some(12));
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_row_cannot_move_up() {
        let list = TripletList::from_triplets(vec![
            set_active_position(5, 0),
            Triplet::new(43, mode::FULL_ROW_COLOUR, 0x01),
        ])
        .unwrap();
        assert_eq!(list.state(0).unwrap().error, None);
        assert_eq!(
            list.state(1).unwrap().error,
            Some(TripletError::ActivePositionMovedUp)
        );
    }

    #[test]
    fn test_column_cannot_move_left() {
        let list = TripletList::from_triplets(vec![
            set_active_position(5, 10),
            Triplet::new(3, 0x09, b'x'),
        ])
        .unwrap();
        assert_eq!(
            list.state(1).unwrap().error,
            Some(TripletError::ActivePositionMovedLeft)
        );
    }

    #[test]
    fn test_column_before_row_deploys_row_zero() {
        let list = TripletList::from_triplets(vec![Triplet::new(8, 0x00, 0x07)]).unwrap();
        let position = list.state(0).unwrap().active_position;
        assert_eq!(position.row, Some(0));
        assert_eq!(position.column, Some(8));
    }

    #[test]
    fn test_set_active_position_reserved_column() {
        let list = TripletList::from_triplets(vec![set_active_position(3, 45)]).unwrap();
        let state = list.state(0).unwrap();
        assert!(state.reserved_data);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_full_screen_colour_after_position() {
        let list = TripletList::from_triplets(vec![
            set_active_position(1, 0),
            Triplet::new(63, mode::FULL_SCREEN_COLOUR, 0x04),
        ])
        .unwrap();
        assert_eq!(
            list.state(1).unwrap().error,
            Some(TripletError::FullScreenColourAfterActivePosition)
        );
    }

    #[test]
    fn test_address_row_0_needs_address_63() {
        let list = TripletList::from_triplets(vec![Triplet::new(50, mode::ADDRESS_ROW_0, 0)]).unwrap();
        assert!(list.state(0).unwrap().reserved_data);
        let list = TripletList::from_triplets(vec![Triplet::new(63, mode::ADDRESS_ROW_0, 0)]).unwrap();
        assert!(!list.state(0).unwrap().reserved_data);
    }

    #[test]
    fn test_origin_modifier_alone() {
        let list = TripletList::from_triplets(vec![
            Triplet::new(40, mode::ORIGIN_MODIFIER, 5),
            set_active_position(2, 0),
        ])
        .unwrap();
        assert_eq!(
            list.state(0).unwrap().error,
            Some(TripletError::OriginModifierAlone)
        );
    }

    #[test]
    fn test_reserved_modes() {
        let list = TripletList::from_triplets(vec![
            Triplet::new(41, 0x02, 0),
            Triplet::new(5, 0x04, 0),
            Triplet::new(6, 0x0D, 0x7F),
        ])
        .unwrap();
        assert!(list.state(0).unwrap().reserved_mode);
        assert!(list.state(1).unwrap().reserved_mode);
        // DRCS character index 63 is reserved
        assert!(list.state(2).unwrap().reserved_data);
    }

    #[test]
    fn test_character_below_printable_range_reserved() {
        let list = TripletList::from_triplets(vec![Triplet::new(4, 0x0F, 0x10)]).unwrap();
        assert!(list.state(0).unwrap().reserved_data);
    }

    #[test]
    fn test_drcs_mode_needs_level_bits() {
        let list = TripletList::from_triplets(vec![Triplet::new(41, mode::DRCS_MODE, 0x40)]).unwrap();
        assert!(list.state(0).unwrap().reserved_data);
    }

    #[test]
    fn test_definition_self_stamps() {
        let list = TripletList::from_triplets(vec![
            Triplet::NO_OP,
            Triplet::NO_OP,
            define(0x7F),
        ])
        .unwrap();
        assert_eq!(list.get(2).unwrap().object_local_index(), 2);
    }

    #[test]
    fn test_invocation_checks() {
        let mut triplets = vec![Triplet::NO_OP; 5];
        triplets.push(define(0));
        triplets.push(invoke(5));
        let list = TripletList::from_triplets(triplets).unwrap();
        assert_eq!(list.state(6).unwrap().error, None);

        let list = TripletList::from_triplets(vec![Triplet::NO_OP, invoke(0)]).unwrap();
        assert_eq!(
            list.state(1).unwrap().error,
            Some(TripletError::InvokeTargetNotDefinition)
        );

        let list = TripletList::from_triplets(vec![invoke(40)]).unwrap();
        assert_eq!(
            list.state(0).unwrap().error,
            Some(TripletError::InvokePointerInvalid)
        );

        let passive = Triplet::new(0x28, mode::DEFINE_PASSIVE_OBJECT, 0);
        let list = TripletList::from_triplets(vec![passive, invoke(0)]).unwrap();
        assert_eq!(
            list.state(1).unwrap().error,
            Some(TripletError::InvokeTypeMismatch)
        );
    }

    #[test]
    fn test_insert_shifts_local_pointers() {
        let mut triplets = vec![Triplet::NO_OP; 5];
        triplets.push(define(0));
        triplets.push(invoke(5));
        let mut list = TripletList::from_triplets(triplets).unwrap();

        let edit = list
            .insert_slice(0, &[Triplet::NO_OP, Triplet::NO_OP])
            .unwrap();
        assert_eq!(edit, ListEdit { range: 0..2, shift: 2 });

        let invocation = list.get(8).unwrap();
        assert_eq!(invocation.object_local_index(), 7);
        assert_eq!(list.get(7).unwrap().object_local_index(), 7);
        assert_eq!(list.state(8).unwrap().error, None);
    }

    #[test]
    fn test_insert_after_target_leaves_pointer() {
        let mut list = TripletList::from_triplets(vec![define(0), invoke(0)]).unwrap();
        list.insert(1, Triplet::NO_OP).unwrap();
        assert_eq!(list.get(2).unwrap().object_local_index(), 0);
        assert_eq!(list.state(2).unwrap().error, None);
    }

    #[test]
    fn test_remove_shifts_local_pointers_back() {
        let mut list = TripletList::from_triplets(vec![
            Triplet::NO_OP,
            Triplet::NO_OP,
            define(0),
            invoke(2),
        ])
        .unwrap();
        let edit = list.remove(0).unwrap();
        assert_eq!(edit.shift, -1);
        assert_eq!(list.get(2).unwrap().object_local_index(), 1);
        assert_eq!(list.get(1).unwrap().object_local_index(), 1);
        assert_eq!(list.state(2).unwrap().error, None);
    }

    #[test]
    fn test_remove_definition_leaves_dangling_pointer() {
        let mut list = TripletList::from_triplets(vec![define(0), invoke(0)]).unwrap();
        list.remove(0).unwrap();
        assert_eq!(
            list.state(0).unwrap().error,
            Some(TripletError::InvokeTargetNotDefinition)
        );
    }

    #[test]
    fn test_replace_recomputes() {
        let mut list = TripletList::from_triplets(vec![
            set_active_position(5, 10),
            Triplet::new(20, 0x09, b'A'),
        ])
        .unwrap();
        list.replace(1, Triplet::new(2, 0x09, b'A')).unwrap();
        assert_eq!(
            list.state(1).unwrap().error,
            Some(TripletError::ActivePositionMovedLeft)
        );
        assert!(list.replace(9, Triplet::NO_OP).is_err());
    }

    #[test]
    fn test_capacity() {
        let mut list = TripletList::from_triplets(vec![Triplet::NO_OP; MAX_TRIPLETS]).unwrap();
        assert_eq!(
            list.append(Triplet::NO_OP),
            Err(CodecError::TripletListFull { capacity: MAX_TRIPLETS })
        );
    }

    #[test]
    fn test_level_1p5_walk_stops_at_terminator() {
        let list = TripletList::from_triplets(vec![
            set_active_position(3, 0),
            Triplet::new(7, 0x0F, b'a'),
            Triplet::TERMINATOR,
            set_active_position(9, 0),
        ])
        .unwrap();
        let state = list.state(1).unwrap();
        assert_eq!(state.active_position_1p5.row, Some(3));
        assert_eq!(state.active_position_1p5.column, Some(7));
        assert_eq!(list.state(3).unwrap().active_position_1p5, Position::default());
        // Level 2.5 walk carries on
        assert_eq!(list.state(3).unwrap().active_position.row, Some(9));
    }

    #[test]
    fn test_blocks() {
        let mut list = TripletList::new();
        let block = [Triplet::new(41, 0x04, 3); TRIPLETS_PER_PACKET];
        list.set_block(1, &block).unwrap();
        assert_eq!(list.len(), 26);
        assert_eq!(list.get(0), Some(&Triplet::NO_OP));
        assert_eq!(list.block(1), Some(block));
        assert_eq!(list.block(2), None);

        list.remove_range(20..26).unwrap();
        let padded = list.block(1).unwrap();
        assert_eq!(padded[7], Triplet::NO_OP);
    }

    #[test]
    fn test_drop_padding_keeps_terminators() {
        let mut list = TripletList::from_triplets(vec![
            set_active_position(1, 0),
            Triplet::TERMINATOR,
            Triplet::NO_OP,
            Triplet::NO_OP,
        ])
        .unwrap();
        list.drop_padding();
        assert_eq!(list.triplets(), &[set_active_position(1, 0), Triplet::TERMINATOR]);
    }

    #[test]
    fn test_drop_padding_stays_in_last_block() {
        let mut triplets = vec![Triplet::NO_OP; TRIPLETS_PER_PACKET + 1];
        triplets.extend_from_slice(&[Triplet::NO_OP; 4]);
        let mut list = TripletList::from_triplets(triplets).unwrap();
        list.drop_padding();
        // Earlier blocks and the first triplet of the last block survive
        assert_eq!(list.len(), TRIPLETS_PER_PACKET + 1);

        let mut empty = TripletList::new();
        empty.drop_padding();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_append_keeps_forward_pointers() {
        let mut list = TripletList::new();
        list.append(invoke(2)).unwrap();
        list.append(Triplet::TERMINATOR).unwrap();
        list.append(define(0)).unwrap();
        assert_eq!(list.get(0).unwrap().object_local_index(), 2);
        assert_eq!(list.state(0).unwrap().error, None);
    }

    #[test]
    fn test_insert_leaves_dangling_pointer_unshifted() {
        let mut list = TripletList::from_triplets(vec![invoke(207), Triplet::NO_OP]).unwrap();
        list.insert(1, Triplet::NO_OP).unwrap();
        assert_eq!(list.get(0).unwrap().object_local_index(), 207);

        let mut list = TripletList::from_triplets(vec![Triplet::NO_OP, invoke(50)]).unwrap();
        list.remove(0).unwrap();
        assert_eq!(list.get(0).unwrap().object_local_index(), 50);
    }

    #[test]
    fn test_row_address_helper() {
        assert_eq!(set_active_position(24, 0).address(), 40);
        assert_eq!(set_active_position(1, 0).address(), 41);
        assert_eq!(set_active_position(23, 0).address(), 63);
    }
}
