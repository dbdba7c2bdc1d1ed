/// Advertisement filtering by sender address, advertised services and signal strength
use crate::bluetooth::advertisement::service_ids;
use crate::error::FilterRejection;
use crate::models::{AdField, AdvertisementReport};

/// Validated filter settings; an empty set or a zero floor disables that filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Address prefixes in display order (`00:07:80` is `[0x00, 0x07, 0x80]`), 1-6 bytes each
    pub mac_prefixes: Vec<Vec<u8>>,
    /// Service identifiers in display order, 2, 4 or 16 bytes each
    pub service_ids: Vec<Vec<u8>>,
    /// Minimum RSSI as a positive magnitude: 80 means -80 dBm
    pub min_rssi_floor: Option<u8>,
}

impl FilterConfig {
    /// Check the MAC, service and RSSI filters in that order
    pub fn evaluate(
        &self,
        report: &AdvertisementReport,
        fields: &[AdField],
    ) -> Result<(), FilterRejection> {
        if !self.mac_prefixes.is_empty() {
            let address = report.sender.display_order();
            let matched = self
                .mac_prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && address.starts_with(prefix));
            if !matched {
                return Err(FilterRejection::Mac(report.sender.to_string()));
            }
        }

        if !self.service_ids.is_empty() {
            let mut advertised = service_ids(fields);
            if !advertised.any(|id| self.service_ids.contains(id)) {
                return Err(FilterRejection::Service);
            }
        }

        if let Some(floor) = self.min_rssi_floor.filter(|&f| f > 0) {
            if (report.rssi as i16) < -(floor as i16) {
                return Err(FilterRejection::Rssi {
                    rssi: report.rssi,
                    floor,
                });
            }
        }

        Ok(())
    }

    pub fn passes(&self, report: &AdvertisementReport, fields: &[AdField]) -> bool {
        self.evaluate(report, fields).is_ok()
    }
}
