//! Property-based tests using proptest

use proptest::prelude::*;
use ttxcodec_core::{
    hamming::{
        hamming_24_18_decode, hamming_24_18_encode, hamming_8_4_checked, hamming_8_4_encode,
        Hamming24,
    },
    constants::MAX_TRIPLETS,
    triplet::mode,
    ControlBit, FormatId, FormatRegistry, LevelOnePage, PageSet, Triplet, TripletList,
};

fn printable_row() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0x20u8..0x7F, 40)
}

/// A list of arbitrary triplets closed by an explicit termination marker
fn terminated_list() -> impl Strategy<Value = Vec<Triplet>> {
    prop::collection::vec(0u32..0x40000, 0..60).prop_map(|values| {
        let mut triplets: Vec<Triplet> = values.into_iter().map(Triplet::from_value).collect();
        triplets.push(Triplet::TERMINATOR);
        triplets
    })
}

fn ep1_page_bytes() -> Vec<u8> {
    let mut data = vec![0xFE, 0x01, 0x00, 0, 0, 0];
    data.extend(std::iter::repeat(b' ').take(24 * 40));
    data.extend_from_slice(&[0, 0]);
    data
}

#[test]
fn test_hamming_24_18_every_value_decodes_valid() {
    for value in 0u32..1 << 18 {
        assert_eq!(
            hamming_24_18_decode(hamming_24_18_encode(value)),
            Hamming24::Valid(value),
            "value {:05X}",
            value
        );
    }
}

proptest! {
    #[test]
    fn prop_hamming_8_4_corrects_single_bit(value in 0u8..16, bit in 0u32..8) {
        let damaged = hamming_8_4_encode(value) ^ (1 << bit);
        prop_assert_eq!(hamming_8_4_checked(damaged), Some(value));
    }

    #[test]
    fn prop_hamming_24_18_corrects_single_bit(value in 0u32..0x40000, bit in 0usize..24) {
        let mut damaged = hamming_24_18_encode(value);
        damaged[bit / 8] ^= 1 << (bit % 8);
        prop_assert_eq!(hamming_24_18_decode(damaged), Hamming24::Corrected(value));
    }

    #[test]
    fn prop_triplet_value_round_trip(address in 0u8..64, mode in 0u8..32, data in 0u8..128) {
        let triplet = Triplet::new(address, mode, data);
        prop_assert_eq!(Triplet::from_value(triplet.value()), triplet);
        prop_assert_eq!(Triplet::from_groups(triplet.groups()), triplet);
    }

    #[test]
    fn prop_triplet_list_states_track_edits(
        values in prop::collection::vec(0u32..0x40000, 0..40),
        remove in 0usize..40,
    ) {
        let triplets: Vec<Triplet> = values.iter().map(|&v| Triplet::from_value(v)).collect();
        let mut list = TripletList::from_triplets(triplets.clone()).unwrap();
        prop_assert_eq!(list.iter().count(), triplets.len());

        if remove < list.len() {
            list.remove(remove).unwrap();
            prop_assert_eq!(list.len(), triplets.len() - 1);
            prop_assert_eq!(list.iter().count(), list.len());
        } else {
            prop_assert!(list.remove(remove).is_err());
        }
    }

    #[test]
    fn prop_t42_round_trip_rows(
        rows in prop::collection::vec(printable_row(), 24),
        subcode in 0u16..0x3F80,
        bits in prop::collection::vec(any::<bool>(), 11),
    ) {
        let mut page = LevelOnePage::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, &ch) in row.iter().enumerate() {
                page.set_character(r + 1, c, ch);
            }
        }
        page.set_subcode(subcode & 0x3F7F);
        for (bit, &value) in ControlBit::ALL.iter().zip(bits.iter()) {
            page.set_control_bit(*bit, value);
        }

        let registry = FormatRegistry::new();
        let t42 = registry.for_extension("t42").unwrap();
        let loaded = t42.load(&t42.save(&PageSet::with_page(0x1A0, page.clone())).data).unwrap();
        prop_assert!(loaded.warnings.is_empty());
        prop_assert_eq!(&loaded.pages.subpages[0], &page);
    }

    #[test]
    fn prop_hamming_24_18_round_trip(value in 0u32..0x40000) {
        prop_assert_eq!(hamming_24_18_decode(hamming_24_18_encode(value)), Hamming24::Valid(value));
    }

    #[test]
    fn prop_terminated_list_survives_t42_and_tti(triplets in terminated_list()) {
        let mut page = LevelOnePage::new();
        page.set_character(1, 0, b'A');
        *page.enhancements_mut() = TripletList::from_triplets(triplets).unwrap();
        let set = PageSet::with_page(0x100, page);

        let registry = FormatRegistry::new();
        for id in [FormatId::T42, FormatId::Tti] {
            let format = registry.get(id).unwrap();
            let loaded = format.load(&format.save(&set).data).unwrap();
            prop_assert_eq!(
                loaded.pages.subpages[0].enhancements(),
                set.subpages[0].enhancements()
            );
        }
    }

    #[test]
    fn prop_ep1_keeps_forward_object_pointers(fillers in 0usize..40) {
        let target = fillers + 1;
        let mut invoke = Triplet::new(0x28, mode::INVOKE_ACTIVE_OBJECT, 0);
        invoke.set_object_local_index(target);
        let mut triplets = vec![invoke];
        triplets.extend(std::iter::repeat(Triplet::NO_OP).take(fillers));
        triplets.push(Triplet::new(0x28, mode::DEFINE_ACTIVE_OBJECT, 0));
        triplets.push(Triplet::TERMINATOR);

        let mut page = LevelOnePage::new();
        *page.enhancements_mut() = TripletList::from_triplets(triplets).unwrap();
        let set = PageSet::with_page(0x100, page);

        let registry = FormatRegistry::new();
        let ep1 = registry.get(FormatId::Ep1).unwrap();
        let loaded = ep1.load(&ep1.save(&set).data).unwrap();
        let list = loaded.pages.subpages[0].enhancements();
        prop_assert_eq!(list.get(0).unwrap().object_local_index(), target);
        prop_assert_eq!(list.state(0).unwrap().error, None);
        prop_assert_eq!(list, set.subpages[0].enhancements());
    }

    #[test]
    fn prop_ep1_oversized_block_truncated(
        triplets in prop::collection::vec(any::<[u8; 3]>(), MAX_TRIPLETS + 1..MAX_TRIPLETS + 60),
    ) {
        let mut data = vec![0xCA];
        data.extend_from_slice(&((triplets.len() * 3) as u16).to_le_bytes());
        for triplet in &triplets {
            data.extend_from_slice(triplet);
        }
        data.extend(ep1_page_bytes());

        let registry = FormatRegistry::new();
        let loaded = registry.get(FormatId::Ep1).unwrap().load(&data).unwrap();
        prop_assert_eq!(loaded.pages.subpages[0].enhancements().len(), MAX_TRIPLETS);
        prop_assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn prop_load_never_panics(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        // Every format either loads or reports an error on arbitrary input
        let registry = FormatRegistry::new();
        for format in registry.iter() {
            let _ = format.load(&data);
        }
    }

    #[test]
    fn prop_tti_load_never_panics(lines in prop::collection::vec("[A-Z]{2},[ -~]{0,60}", 0..30)) {
        let text = lines.join("\r\n");
        let registry = FormatRegistry::new();
        let tti = registry.for_extension("tti").unwrap();
        if let Ok(outcome) = tti.load(text.as_bytes()) {
            let _ = tti.save(&outcome.pages);
        }
    }
}
