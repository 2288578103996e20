//! Station-mode WiFi for the ESP32-C3.
//!
//! The alarm only needs the network for the disarm endpoint, so a link
//! that cannot be brought up is reported to the caller, who keeps the
//! sensor running offline.

use crate::config::WifiConfig;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use std::net::Ipv4Addr;
use std::thread;
use std::time::{Duration, Instant};

/// Pause between association attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// A joined access point.
///
/// Dropping this value shuts the radio down.
///
/// # Example
///
/// ```ignore
/// let wifi = Esp32Wifi::new(peripherals.modem, sysloop, Some(nvs), &config.wifi)?;
/// tracing::info!(ip = ?wifi.ip_addr(), "online");
/// ```
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
    connect_timeout: Duration,
}

impl<'a> Esp32Wifi<'a> {
    /// Join the network named in `config`.
    ///
    /// Association is retried until `config.connect_timeout_ms` has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials do not fit the driver, the
    /// radio fails to start, or no address is obtained in time.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &WifiConfig,
    ) -> anyhow::Result<Self> {
        let station = ClientConfiguration {
            ssid: config
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSID longer than 32 bytes"))?,
            password: config
                .password
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("WiFi password longer than 64 bytes"))?,
            ..Default::default()
        };

        let driver = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(driver, sysloop)?;
        wifi.set_configuration(&Configuration::Client(station))?;
        wifi.start()?;

        let mut this = Self {
            wifi,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms.into()),
        };
        tracing::info!(ssid = config.ssid.as_str(), "joining wifi");
        this.join()?;
        Ok(this)
    }

    /// Address assigned by DHCP, if any.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        let netif = self.wifi.wifi().sta_netif();
        netif.get_ip_info().ok().map(|info| info.ip)
    }

    /// Whether the station is still associated.
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    /// Rejoin if the access point dropped the station.
    ///
    /// Returns `Ok(true)` when a reconnect was needed and succeeded.
    pub fn ensure_connected(&mut self) -> anyhow::Result<bool> {
        if self.is_connected() {
            return Ok(false);
        }
        tracing::warn!("wifi link lost; rejoining");
        self.join()?;
        Ok(true)
    }

    fn join(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + self.connect_timeout;
        loop {
            match self.wifi.connect() {
                Ok(()) => break,
                Err(e) if Instant::now() < deadline => {
                    tracing::debug!(error = %e, "association failed; retrying");
                    thread::sleep(RETRY_DELAY);
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.wifi.wait_netif_up()?;
        tracing::info!(ip = ?self.ip_addr(), "wifi up");
        Ok(())
    }
}
