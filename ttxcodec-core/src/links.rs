//! FastText (X/27/0) and compose (X/27/4, X/27/5) links

use crate::constants::{ANY_SUBPAGE, NULL_PAGE};
use serde::{Deserialize, Serialize};

/// Convert a magazine-relative page number to the absolute number shown to users
///
/// Magazine 0 after the XOR is shown as magazine 8.
pub const fn relative_to_absolute(relative: u16, own_magazine: u8) -> u16 {
    let absolute = (relative & 0x7FF) ^ (((own_magazine & 0x07) as u16) << 8);
    if absolute & 0x700 == 0 {
        absolute | 0x800
    } else {
        absolute
    }
}

/// Convert an absolute page number (magazine 1-8) to the stored relative form
pub const fn absolute_to_relative(absolute: u16, own_magazine: u8) -> u16 {
    (absolute & 0x7FF) ^ (((own_magazine & 0x07) as u16) << 8)
}

/// One FastText navigation link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FastTextLink {
    /// Page number relative to the page's own magazine: bits 8-10 are the
    /// magazine XOR, bits 0-7 the page units and tens
    pub page: u16,
    /// Sub-page code, [`ANY_SUBPAGE`] for no particular sub-page
    pub subpage: u16,
}

impl FastTextLink {
    /// Link to page FF of the same magazine, any sub-page
    pub const NULL: FastTextLink = FastTextLink {
        page: NULL_PAGE,
        subpage: ANY_SUBPAGE,
    };

    /// Whether this is the null link
    pub fn is_null(&self) -> bool {
        self.page & 0xFF == 0xFF
    }

    /// Whether the link targets a particular sub-page
    pub fn has_specific_subpage(&self) -> bool {
        self.subpage != ANY_SUBPAGE
    }

    /// Unpack from six 4-bit values
    pub const fn from_nibbles(n: [u8; 6]) -> Self {
        let magazine = ((n[3] >> 3) & 0x01) | ((n[5] >> 1) & 0x06);
        let page = (n[0] & 0x0F) as u16 | ((n[1] & 0x0F) as u16) << 4 | (magazine as u16) << 8;
        let subpage = (n[2] & 0x0F) as u16
            | ((n[3] & 0x07) as u16) << 4
            | ((n[4] & 0x0F) as u16) << 8
            | ((n[5] & 0x03) as u16) << 12;
        Self { page, subpage }
    }

    /// Pack into six 4-bit values `[units, tens, S1, S2|M1, S3, S4|M2|M3]`
    pub const fn nibbles(&self) -> [u8; 6] {
        let magazine = ((self.page >> 8) & 0x07) as u8;
        [
            (self.page & 0x0F) as u8,
            ((self.page >> 4) & 0x0F) as u8,
            (self.subpage & 0x0F) as u8,
            ((self.subpage >> 4) & 0x07) as u8 | (magazine & 0x01) << 3,
            ((self.subpage >> 8) & 0x0F) as u8,
            ((self.subpage >> 12) & 0x03) as u8 | (magazine & 0x06) << 1,
        ]
    }
}

impl Default for FastTextLink {
    fn default() -> Self {
        Self::NULL
    }
}

/// One compose link: a page whose objects or DRCS are combined with this one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComposeLink {
    /// 0 GPOP, 1 POP, 2 GDRCS, 3 DRCS
    pub function: u8,
    /// Required at level 2.5
    pub level_2p5: bool,
    /// Required at level 3.5
    pub level_3p5: bool,
    /// Magazine-relative page number
    pub page: u16,
    /// Bitmask of the sub-pages that are used
    pub subpage_mask: u16,
}

impl ComposeLink {
    /// Unused link slot `index`
    pub const fn unused(index: usize) -> Self {
        Self {
            function: (index & 0x03) as u8,
            level_2p5: false,
            level_3p5: false,
            page: NULL_PAGE,
            subpage_mask: 0,
        }
    }

    /// Whether the link points at a page
    pub fn exists(&self) -> bool {
        self.page & 0xFF != 0xFF
    }

    /// Unpack from six 6-bit groups
    pub const fn from_groups(g: [u8; 6]) -> Self {
        Self {
            function: g[0] & 0x03,
            level_2p5: g[0] & 0x04 != 0,
            level_3p5: g[0] & 0x08 != 0,
            page: (g[1] & 0x0F) as u16
                | ((g[2] & 0x0F) as u16) << 4
                | ((g[1] & 0x20) as u16) << 3
                | ((g[2] & 0x30) as u16) << 5,
            subpage_mask: ((g[3] >> 2) & 0x0F) as u16
                | ((g[4] & 0x3F) as u16) << 4
                | ((g[5] & 0x3F) as u16) << 10,
        }
    }

    /// Pack into six 6-bit groups; bit 4 of the second group is always set
    pub const fn groups(&self) -> [u8; 6] {
        [
            (self.function & 0x03) | (self.level_2p5 as u8) << 2 | (self.level_3p5 as u8) << 3,
            (self.page & 0x0F) as u8 | 0x10 | ((self.page & 0x100) >> 3) as u8,
            ((self.page >> 4) & 0x0F) as u8 | ((self.page & 0x600) >> 5) as u8,
            ((self.subpage_mask & 0x0F) << 2) as u8,
            ((self.subpage_mask >> 4) & 0x3F) as u8,
            ((self.subpage_mask >> 10) & 0x3F) as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_absolute() {
        // Page 1A5 linking to 2B0: stored magazine is 1 ^ 2 = 3
        let relative = absolute_to_relative(0x2B0, 1);
        assert_eq!(relative, 0x3B0);
        assert_eq!(relative_to_absolute(relative, 1), 0x2B0);
        // Same magazine gives magazine bits 0, except for magazine 8 itself
        assert_eq!(absolute_to_relative(0x8FF, 8), 0x0FF);
        assert_eq!(relative_to_absolute(0x0FF, 8), 0x8FF);
        assert_eq!(relative_to_absolute(0x1FF, 1), 0x8FF);
    }

    #[test]
    fn test_fasttext_nibbles() {
        let link = FastTextLink {
            page: 0x7A3,
            subpage: 0x2F5B,
        };
        let nibbles = link.nibbles();
        assert_eq!(nibbles, [0x3, 0xA, 0xB, 0x5 | 0x8, 0xF, 0x2 | 0x4 | 0x8]);
        assert!(nibbles.iter().all(|&n| n <= 0x0F));
        assert_eq!(FastTextLink::from_nibbles(nibbles), link);
    }

    #[test]
    fn test_null_link() {
        assert!(FastTextLink::NULL.is_null());
        assert!(!FastTextLink::NULL.has_specific_subpage());
        assert_eq!(FastTextLink::NULL.nibbles(), [0xF, 0xF, 0xF, 0x7, 0xF, 0x3]);
    }

    #[test]
    fn test_compose_groups() {
        let link = ComposeLink {
            function: 1,
            level_2p5: true,
            level_3p5: false,
            page: 0x5C2,
            subpage_mask: 0xBEEF,
        };
        let groups = link.groups();
        assert!(groups.iter().all(|&g| g <= 0x3F));
        assert_eq!(groups[1] & 0x10, 0x10);
        assert_eq!(ComposeLink::from_groups(groups), link);
    }

    #[test]
    fn test_unused_compose_link() {
        let link = ComposeLink::unused(2);
        assert_eq!(link.function, 2);
        assert!(!link.exists());
    }
}
