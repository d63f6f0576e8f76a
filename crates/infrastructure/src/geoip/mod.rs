pub mod connection_type;
mod intelligence;

pub use intelligence::CachedIpIntelligence;

use autoguard_domain::config::GeoIpConfig;
use autoguard_domain::{ConnectionType, IpIntelligence};
use connection_type::infer_connection_type;
use maxminddb::{geoip2, Mmap, Reader};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, info, warn};

/// The three on-disk GeoIP databases. Any of them may be missing: the
/// corresponding fields stay unknown for the process lifetime, which is
/// logged once at startup and is never fatal.
pub struct GeoIpService {
    city: Option<Reader<Mmap>>,
    asn: Option<Reader<Mmap>>,
    anonymous: Option<Reader<Mmap>>,
}

impl GeoIpService {
    pub fn open(cfg: &GeoIpConfig) -> Self {
        Self {
            city: open_reader(&cfg.city_db_path, "city"),
            asn: open_reader(&cfg.asn_db_path, "asn"),
            anonymous: open_reader(&cfg.anonymous_db_path, "anonymous-ip"),
        }
    }

    pub fn databases_available(&self) -> (bool, bool, bool) {
        (
            self.city.is_some(),
            self.asn.is_some(),
            self.anonymous.is_some(),
        )
    }

    /// Resolve one IP against whatever databases are present. Reads are
    /// mmap-backed and must be treated as blocking; callers run this under
    /// `spawn_blocking`. Single-database read errors degrade to partial
    /// results.
    pub fn lookup_sync(&self, ip: IpAddr) -> IpIntelligence {
        let mut intel = IpIntelligence::unknown(ip);

        if let Some(reader) = &self.city {
            match reader.lookup::<geoip2::City>(ip) {
                Ok(Some(city)) => {
                    intel.country = city
                        .country
                        .as_ref()
                        .and_then(|c| c.iso_code)
                        .map(str::to_string);
                    intel.region = city
                        .subdivisions
                        .as_ref()
                        .and_then(|subs| subs.first())
                        .and_then(|s| s.iso_code)
                        .map(str::to_string);
                    intel.city = city
                        .city
                        .as_ref()
                        .and_then(|c| c.names.as_ref())
                        .and_then(|names| names.get("en"))
                        .map(|s| s.to_string());
                    if let Some(location) = &city.location {
                        intel.timezone = location.time_zone.map(str::to_string);
                        intel.latitude = location.latitude;
                        intel.longitude = location.longitude;
                    }
                }
                Ok(None) => debug!(%ip, "IP not present in city database"),
                Err(e) => warn!(%ip, error = %e, "City database read failed"),
            }
        }

        if let Some(reader) = &self.asn {
            match reader.lookup::<geoip2::Asn>(ip) {
                Ok(Some(asn)) => {
                    intel.asn = asn.autonomous_system_number;
                    intel.organization = asn.autonomous_system_organization.map(str::to_string);
                    if let Some(org) = &intel.organization {
                        intel.connection_type = infer_connection_type(org);
                        intel.is_datacenter = intel.connection_type == ConnectionType::Datacenter;
                        intel.is_residential =
                            intel.connection_type == ConnectionType::Residential;
                    }
                }
                Ok(None) => debug!(%ip, "IP not present in ASN database"),
                Err(e) => warn!(%ip, error = %e, "ASN database read failed"),
            }
        }

        if let Some(reader) = &self.anonymous {
            match reader.lookup::<geoip2::AnonymousIp>(ip) {
                Ok(Some(anon)) => {
                    // Positive anonymity data overrides keyword inference
                    // and rules out a residential classification.
                    let vpn = anon.is_anonymous_vpn.unwrap_or(false);
                    let proxy = anon.is_public_proxy.unwrap_or(false);
                    let tor = anon.is_tor_exit_node.unwrap_or(false);
                    let hosting = anon.is_hosting_provider.unwrap_or(false);
                    if vpn || proxy || tor || hosting {
                        intel.is_vpn = vpn;
                        intel.is_proxy = proxy;
                        intel.is_tor = tor;
                        intel.is_hosting = hosting;
                        if hosting {
                            intel.is_datacenter = true;
                            intel.connection_type = ConnectionType::Datacenter;
                        }
                        intel.is_residential = false;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(%ip, error = %e, "Anonymous-IP database read failed"),
            }
        }

        intel
    }
}

fn open_reader(path: &str, label: &str) -> Option<Reader<Mmap>> {
    if !Path::new(path).exists() {
        warn!(path, db = label, "GeoIP database missing, fields degrade to unknown");
        return None;
    }
    match Reader::open_mmap(path) {
        Ok(reader) => {
            info!(path, db = label, "GeoIP database loaded");
            Some(reader)
        }
        Err(e) => {
            warn!(path, db = label, error = %e, "GeoIP database unreadable, fields degrade to unknown");
            None
        }
    }
}
