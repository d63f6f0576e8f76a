use autoguard_domain::config::GeoIpConfig;
use autoguard_infrastructure::GeoIpService;
use std::sync::Arc;
use tracing::info;

pub fn init_geoip(cfg: &GeoIpConfig) -> Arc<GeoIpService> {
    let service = Arc::new(GeoIpService::open(cfg));
    let (city, asn, anonymous) = service.databases_available();
    info!(city, asn, anonymous, "GeoIP databases opened");
    service
}
