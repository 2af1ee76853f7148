//! Raw advertising data parsing
//!
//! Some platforms hand over the undecoded advertising report instead of a
//! parsed manufacturer-data map. A report is a sequence of AD structures:
//!
//! ```text
//! [len][type][data; len - 1] [len][type][data; len - 1] ...
//! ```
//!
//! Manufacturer-specific data (type `0xFF`) starts with the little-endian
//! company identifier. A zero length byte ends the significant part of the
//! report; a structure running past the end of the buffer ends the walk.

use std::time::Instant;

use crate::types::{AdvertisementFrame, DeviceId};

/// AD type of the manufacturer-specific data field
pub const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

/// One AD structure borrowed from a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdStructure<'a> {
    pub ad_type: u8,
    pub data: &'a [u8],
}

/// Iterator over the AD structures of a report
#[derive(Debug, Clone)]
pub struct AdStructures<'a> {
    report: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = AdStructure<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = *self.report.get(self.pos)? as usize;
        if len == 0 {
            self.pos = self.report.len();
            return None;
        }

        let start = self.pos + 1;
        let end = start + len;
        if end > self.report.len() {
            self.pos = self.report.len();
            return None;
        }

        self.pos = end;
        Some(AdStructure { ad_type: self.report[start], data: &self.report[start + 1..end] })
    }
}

/// Walk the AD structures of a raw advertising report.
pub fn ad_structures(report: &[u8]) -> AdStructures<'_> {
    AdStructures { report, pos: 0 }
}

/// Every manufacturer-specific field as `(company_id, data)`.
pub fn manufacturer_fields(report: &[u8]) -> impl Iterator<Item = (u16, &[u8])> {
    ad_structures(report)
        .filter(|ad| ad.ad_type == AD_TYPE_MANUFACTURER_DATA)
        .filter_map(|ad| match ad.data {
            [lo, hi, rest @ ..] => Some((u16::from_le_bytes([*lo, *hi]), rest)),
            _ => None,
        })
}

/// First manufacturer-specific field of a report.
pub fn manufacturer_data(report: &[u8]) -> Option<(u16, &[u8])> {
    manufacturer_fields(report).next()
}

impl AdvertisementFrame {
    /// Build a frame from a raw advertising report.
    ///
    /// Prefers the field registered under `preferred_company`, falling back
    /// to the first manufacturer field. Returns `None` when the report has no
    /// manufacturer-specific data at all.
    pub fn from_ad_report(
        device_id: impl Into<DeviceId>,
        report: &[u8],
        preferred_company: u16,
        rssi: i16,
        observed_at: Instant,
    ) -> Option<Self> {
        let (company, data) = manufacturer_fields(report)
            .find(|(company, _)| *company == preferred_company)
            .or_else(|| manufacturer_data(report))?;

        Some(Self::new(device_id, company, data.to_vec(), rssi, observed_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{VENDOR_ID, decode};
    use crate::types::DecodedColor;

    // Flags, then manufacturer data for 0xFFFF carrying {0xAB, 10, 20, 30}
    const REPORT: &[u8] = &[0x02, 0x01, 0x06, 0x07, 0xFF, 0xFF, 0xFF, 0xAB, 10, 20, 30];

    #[test]
    fn walks_structures_in_order() {
        let types: Vec<u8> = ad_structures(REPORT).map(|ad| ad.ad_type).collect();
        assert_eq!(types, vec![0x01, 0xFF]);
    }

    #[test]
    fn extracts_vendor_payload() {
        let (company, data) = manufacturer_data(REPORT).unwrap();
        assert_eq!(company, VENDOR_ID);
        assert_eq!(decode(company, data), Ok(DecodedColor::new(10, 20, 30)));
    }

    #[test]
    fn stops_at_zero_length_padding() {
        let mut report = REPORT.to_vec();
        report.splice(0..0, [0x00, 0x03, 0xFF, 0x4C, 0x00]);
        assert_eq!(ad_structures(&report).count(), 0);
    }

    #[test]
    fn truncated_structure_ends_walk() {
        let report = [0x02, 0x01, 0x06, 0x09, 0xFF, 0xFF, 0xFF, 0xAB];
        assert_eq!(ad_structures(&report).count(), 1);
        assert_eq!(manufacturer_data(&report), None);
    }

    #[test]
    fn manufacturer_field_without_company_is_skipped() {
        let report = [0x02, 0xFF, 0x01];
        assert_eq!(manufacturer_data(&report), None);
    }

    #[test]
    fn prefers_requested_company() {
        let report = [
            0x05, 0xFF, 0x4C, 0x00, 0x01, 0x02, // Apple
            0x07, 0xFF, 0xFF, 0xFF, 0xAB, 1, 2, 3, // vendor
        ];
        let frame =
            AdvertisementFrame::from_ad_report("lamp-1", &report, VENDOR_ID, -40, Instant::now())
                .unwrap();
        assert_eq!(frame.manufacturer_id, VENDOR_ID);
        assert_eq!(&*frame.payload, &[0xAB, 1, 2, 3]);

        let fallback =
            AdvertisementFrame::from_ad_report("lamp-1", &report, 0x0059, -40, Instant::now())
                .unwrap();
        assert_eq!(fallback.manufacturer_id, 0x004C);
    }

    #[test]
    fn report_without_manufacturer_data_yields_nothing() {
        let report = [0x02, 0x01, 0x06];
        assert!(AdvertisementFrame::from_ad_report("x", &report, VENDOR_ID, 0, Instant::now()).is_none());
        assert_eq!(ad_structures(&[]).count(), 0);
    }
}
