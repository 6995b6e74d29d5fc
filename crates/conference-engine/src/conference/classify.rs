use rvoip_ari_core::{Bridge, ConferenceType};

use crate::error::{ConferenceError, Result};

/// What a bridge is for, as far as conferences are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeRole {
    /// Transient bridge gating one call into the main conference bridge
    Join,
    /// Self-service echo test
    Echo,
    /// Ordinary multi-party mixing
    Mixing,
}

/// Classify a bridge from its metadata
///
/// The join flag wins over the conference type, and echo wins over mixing. A bridge
/// with no conference type is an error.
pub fn classify(bridge: &Bridge) -> Result<BridgeRole> {
    if bridge.conference_join {
        return Ok(BridgeRole::Join);
    }
    match bridge.conference_type {
        ConferenceType::Echo => Ok(BridgeRole::Echo),
        ConferenceType::Conference | ConferenceType::Connect | ConferenceType::Transfer => {
            Ok(BridgeRole::Mixing)
        }
        ConferenceType::None => Err(ConferenceError::classification(format!(
            "bridge {} ({}) carries no conference type",
            bridge.id, bridge.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvoip_ari_core::event::AriBridge;
    use rvoip_ari_core::model::bridge_name;
    use uuid::Uuid;

    fn bridge(name: String) -> Bridge {
        let ari = AriBridge {
            id: "b1".to_string(),
            name,
            ..Default::default()
        };
        Bridge::from_ari("ast-1", &ari, "2024-01-01 00:00:00.000000")
    }

    #[test]
    fn test_join_flag_has_priority() {
        let name = bridge_name::encode(Uuid::new_v4(), ConferenceType::Conference, true);
        assert_eq!(classify(&bridge(name)).unwrap(), BridgeRole::Join);

        let name = bridge_name::encode(Uuid::new_v4(), ConferenceType::Echo, true);
        assert_eq!(classify(&bridge(name)).unwrap(), BridgeRole::Join);
    }

    #[test]
    fn test_types() {
        let id = Uuid::new_v4();
        assert_eq!(
            classify(&bridge(bridge_name::encode(id, ConferenceType::Echo, false))).unwrap(),
            BridgeRole::Echo
        );
        for t in [ConferenceType::Conference, ConferenceType::Connect, ConferenceType::Transfer] {
            assert_eq!(
                classify(&bridge(bridge_name::encode(id, t, false))).unwrap(),
                BridgeRole::Mixing
            );
        }
    }

    #[test]
    fn test_foreign_bridge_is_an_error() {
        let err = classify(&bridge("holding-bridge".to_string())).unwrap_err();
        assert!(matches!(err, ConferenceError::Classification(_)));
    }
}
