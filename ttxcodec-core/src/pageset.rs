//! Pages exchanged with the file codecs

use crate::page::LevelOnePage;
use alloc::string::String;
use alloc::vec::Vec;

/// A page number with its sub-pages, as stored in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet {
    /// Page number 0x100-0x8FF; magazine 8 is written as 0x8xx
    pub page_number: u16,
    /// Free text description
    pub description: String,
    /// Sub-pages in transmission order
    pub subpages: Vec<LevelOnePage>,
}

impl Default for PageSet {
    fn default() -> Self {
        Self::new(0x100)
    }
}

impl PageSet {
    /// Create an empty page set
    pub fn new(page_number: u16) -> Self {
        Self {
            page_number,
            description: String::new(),
            subpages: Vec::new(),
        }
    }

    /// Create a page set holding one sub-page
    pub fn with_page(page_number: u16, page: LevelOnePage) -> Self {
        let mut set = Self::new(page_number);
        set.subpages.push(page);
        set
    }

    /// Magazine 1-8
    pub fn magazine(&self) -> u8 {
        match (self.page_number >> 8) & 0x07 {
            0 => 8,
            magazine => magazine as u8,
        }
    }

    /// Page units and tens
    pub fn page_byte(&self) -> u8 {
        (self.page_number & 0xFF) as u8
    }

    /// Number of sub-pages
    pub fn len(&self) -> usize {
        self.subpages.len()
    }

    /// Whether the set holds no sub-pages
    pub fn is_empty(&self) -> bool {
        self.subpages.is_empty()
    }
}
