//! Vendor registry: resolves a vendor id to its registered adapter(s).

use std::collections::HashMap;
use std::sync::Arc;

use speechbench_core::VendorError;
use speechbench_core::ports::{SttAdapter, TtsAdapter};

/// Maps vendor ids to their registered TTS/STT adapters.
///
/// A vendor may support one or both capabilities; lookups for an
/// unregistered capability return `VendorError::UnknownVendor`.
#[derive(Default)]
pub struct VendorRegistry {
    tts: HashMap<String, Arc<dyn TtsAdapter>>,
    stt: HashMap<String, Arc<dyn SttAdapter>>,
}

impl VendorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tts(&mut self, adapter: Arc<dyn TtsAdapter>) {
        self.tts.insert(adapter.vendor_id().to_string(), adapter);
    }

    pub fn register_stt(&mut self, adapter: Arc<dyn SttAdapter>) {
        self.stt.insert(adapter.vendor_id().to_string(), adapter);
    }

    pub fn tts(&self, vendor_id: &str) -> Result<Arc<dyn TtsAdapter>, VendorError> {
        self.tts
            .get(vendor_id)
            .cloned()
            .ok_or_else(|| VendorError::UnknownVendor(vendor_id.to_string()))
    }

    pub fn stt(&self, vendor_id: &str) -> Result<Arc<dyn SttAdapter>, VendorError> {
        self.stt
            .get(vendor_id)
            .cloned()
            .ok_or_else(|| VendorError::UnknownVendor(vendor_id.to_string()))
    }

    #[must_use]
    pub fn tts_vendors(&self) -> Vec<String> {
        self.tts.keys().cloned().collect()
    }

    #[must_use]
    pub fn stt_vendors(&self) -> Vec<String> {
        self.stt.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_adapter::LocalAdapter;

    #[test]
    fn unregistered_vendor_is_unknown() {
        let registry = VendorRegistry::new();
        let err = registry.tts("nope").unwrap_err();
        assert!(matches!(err, VendorError::UnknownVendor(_)));
    }

    #[test]
    fn registered_vendor_is_resolvable() {
        let mut registry = VendorRegistry::new();
        registry.register_tts(Arc::new(LocalAdapter::new("local")));
        assert!(registry.tts("local").is_ok());
        assert_eq!(registry.tts_vendors(), vec!["local".to_string()]);
    }
}
