//! Static service catalog.
//!
//! The default set of service kinds a new location is populated with. This is
//! the only place the list is declared; auto-population and the catalog
//! endpoint both read [`DEFAULT_CATALOG`].

use serde::{Deserialize, Serialize};

/// Enumerated service kinds a line item can be priced as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    StorageCharges,
    InboundHandling,
    OutboundHandling,
    PickPack,
    PackagingMaterial,
    LabellingServices,
    WmsPlatform,
    ValueAdded,
}

/// Default catalog, in display order.
pub const DEFAULT_CATALOG: [ServiceKind; 8] = [
    ServiceKind::StorageCharges,
    ServiceKind::InboundHandling,
    ServiceKind::OutboundHandling,
    ServiceKind::PickPack,
    ServiceKind::PackagingMaterial,
    ServiceKind::LabellingServices,
    ServiceKind::WmsPlatform,
    ServiceKind::ValueAdded,
];

impl ServiceKind {
    /// Stable identifier used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::StorageCharges => "storage_charges",
            ServiceKind::InboundHandling => "inbound_handling",
            ServiceKind::OutboundHandling => "outbound_handling",
            ServiceKind::PickPack => "pick_pack",
            ServiceKind::PackagingMaterial => "packaging_material",
            ServiceKind::LabellingServices => "labelling_services",
            ServiceKind::WmsPlatform => "wms_platform",
            ServiceKind::ValueAdded => "value_added",
        }
    }

    /// Human readable label shown in documents.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::StorageCharges => "Storage Charges (per pallet per month)",
            ServiceKind::InboundHandling => "Inbound Handling (per unit)",
            ServiceKind::OutboundHandling => "Outbound Handling (per unit)",
            ServiceKind::PickPack => "Pick & Pack (per order)",
            ServiceKind::PackagingMaterial => "Packaging Material",
            ServiceKind::LabellingServices => "Labelling Services",
            ServiceKind::WmsPlatform => "WMS Platform Access (monthly per pallet)",
            ServiceKind::ValueAdded => "Value-Added Services",
        }
    }

    /// Whether this kind carries a storage unit type.
    pub fn has_unit_type(&self) -> bool {
        matches!(self, ServiceKind::StorageCharges)
    }

    pub fn parse(value: &str) -> Option<ServiceKind> {
        DEFAULT_CATALOG
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Billing basis for storage charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageUnitType {
    #[default]
    PerPallet,
    PerSqft,
}

impl StorageUnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageUnitType::PerPallet => "per_pallet",
            StorageUnitType::PerSqft => "per_sqft",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageUnitType::PerPallet => "per pallet per month",
            StorageUnitType::PerSqft => "per sq. ft. per month",
        }
    }

    pub fn parse(value: &str) -> Option<StorageUnitType> {
        match value {
            "per_pallet" => Some(StorageUnitType::PerPallet),
            "per_sqft" => Some(StorageUnitType::PerSqft),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let ids: Vec<&str> = DEFAULT_CATALOG.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "storage_charges",
                "inbound_handling",
                "outbound_handling",
                "pick_pack",
                "packaging_material",
                "labelling_services",
                "wms_platform",
                "value_added",
            ]
        );
    }

    #[test]
    fn test_parse_round_trips_every_kind() {
        for kind in DEFAULT_CATALOG {
            assert_eq!(ServiceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ServiceKind::parse("helicopter"), None);
    }

    #[test]
    fn test_only_storage_has_unit_type() {
        let with_unit: Vec<ServiceKind> = DEFAULT_CATALOG
            .iter()
            .copied()
            .filter(|k| k.has_unit_type())
            .collect();
        assert_eq!(with_unit, vec![ServiceKind::StorageCharges]);
    }

    #[test]
    fn test_serde_uses_snake_case_ids() {
        let json = serde_json::to_string(&ServiceKind::PickPack).unwrap();
        assert_eq!(json, "\"pick_pack\"");
        let unit: StorageUnitType = serde_json::from_str("\"per_sqft\"").unwrap();
        assert_eq!(unit, StorageUnitType::PerSqft);
    }
}
