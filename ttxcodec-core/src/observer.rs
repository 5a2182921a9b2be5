//! Change notification for hosts that keep views of a page
//!
//! Pages never notify on their own. A host that wants notifications edits
//! through an [`ObservedPage`], which forwards each mutation to the page and
//! then reports it to the registered [`PageObserver`].

use crate::enhancement::ListEdit;
use crate::packet::{Packet, PacketStore};
use crate::page::{ControlBit, LevelOnePage};
use crate::triplet::Triplet;
use crate::Result;
use core::ops::Range;

/// What changed on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageChange {
    /// A character cell
    Character {
        /// Row 0-24
        row: usize,
        /// Column 0-39
        column: usize,
    },
    /// A whole packet, with its designation code for packets 26-29
    Packet {
        /// Packet number
        number: u8,
        /// Designation code
        code: Option<u8>,
    },
    /// The enhancement triplet list
    Triplets(ListEdit),
    /// Sub-page code or a control bit
    Header,
}

/// Receives page changes made through an [`ObservedPage`]
pub trait PageObserver {
    /// Called after each change
    fn page_changed(&mut self, change: &PageChange);
}

impl<F: FnMut(&PageChange)> PageObserver for F {
    fn page_changed(&mut self, change: &PageChange) {
        self(change)
    }
}

/// Mutable view of a page that reports every edit to an observer
pub struct ObservedPage<'a, O: PageObserver> {
    page: &'a mut LevelOnePage,
    observer: &'a mut O,
}

impl<'a, O: PageObserver> ObservedPage<'a, O> {
    /// Wrap `page`, reporting to `observer`
    pub fn new(page: &'a mut LevelOnePage, observer: &'a mut O) -> Self {
        Self { page, observer }
    }

    /// The wrapped page
    pub fn page(&self) -> &LevelOnePage {
        self.page
    }

    /// Set one character
    pub fn set_character(&mut self, row: usize, column: usize, character: u8) {
        self.page.set_character(row, column, character);
        self.observer
            .page_changed(&PageChange::Character { row, column });
    }

    /// Store a display packet
    pub fn set_packet(&mut self, number: u8, data: &Packet) -> Result<()> {
        self.page.set_packet(number, data)?;
        self.observer.page_changed(&PageChange::Packet { number, code: None });
        Ok(())
    }

    /// Store a designation packet
    pub fn set_designation_packet(&mut self, number: u8, code: u8, data: &Packet) -> Result<()> {
        self.page.set_designation_packet(number, code, data)?;
        self.observer.page_changed(&PageChange::Packet {
            number,
            code: Some(code),
        });
        Ok(())
    }

    /// Insert triplets at `index`
    pub fn insert_triplets(&mut self, index: usize, triplets: &[Triplet]) -> Result<ListEdit> {
        let edit = self.page.enhancements_mut().insert_slice(index, triplets)?;
        self.observer.page_changed(&PageChange::Triplets(edit.clone()));
        Ok(edit)
    }

    /// Remove the triplets in `range`
    pub fn remove_triplets(&mut self, range: Range<usize>) -> Result<ListEdit> {
        let edit = self.page.enhancements_mut().remove_range(range)?;
        self.observer.page_changed(&PageChange::Triplets(edit.clone()));
        Ok(edit)
    }

    /// Replace the triplet at `index`
    pub fn replace_triplet(&mut self, index: usize, triplet: Triplet) -> Result<ListEdit> {
        let edit = self.page.enhancements_mut().replace(index, triplet)?;
        self.observer.page_changed(&PageChange::Triplets(edit.clone()));
        Ok(edit)
    }

    /// Set the sub-page code
    pub fn set_subcode(&mut self, subcode: u16) {
        self.page.set_subcode(subcode);
        self.observer.page_changed(&PageChange::Header);
    }

    /// Set a header control bit
    pub fn set_control_bit(&mut self, bit: ControlBit, value: bool) {
        self.page.set_control_bit(bit, value);
        self.observer.page_changed(&PageChange::Header);
    }
}
