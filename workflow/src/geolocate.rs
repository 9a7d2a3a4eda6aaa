use async_trait::async_trait;

/// One position fix from the device's location API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoReading {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the current position on demand. There is no retry and no
/// fallback source; the calling workflow owns the timeout and surfaces any
/// failure to the user immediately.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoReading, GeoError>;
}

/// Always reports the same position. Test stand-in for a device API.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub GeoReading);

impl FixedLocator {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self(GeoReading {
            latitude,
            longitude,
            accuracy_meters: 5.0,
        })
    }
}

#[async_trait]
impl GeolocationProvider for FixedLocator {
    async fn current_position(&self) -> Result<GeoReading, GeoError> {
        Ok(self.0)
    }
}

/// Always fails, the way a denied browser permission does.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocator;

#[async_trait]
impl GeolocationProvider for UnavailableLocator {
    async fn current_position(&self) -> Result<GeoReading, GeoError> {
        Err(GeoError::PermissionDenied)
    }
}
