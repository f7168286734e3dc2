//! Fixtures shared by the tests of the other crates.

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::LazyLock,
};

use chrono::{DateTime, TimeZone, Utc};
use portfolio_models::email_address::EmailAddressWithName;

pub mod contact;

pub const CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
pub const OTHER_CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 42));

pub static NOW: LazyLock<DateTime<Utc>> =
    LazyLock::new(|| Utc.with_ymd_and_hms(2024, 5, 17, 13, 37, 42).unwrap());

/// Address that receives the contact form submissions.
pub static CONTACT_RECIPIENT: LazyLock<EmailAddressWithName> =
    LazyLock::new(|| "Portfolio Owner <owner@example.com>".parse().unwrap());

pub const MESSAGE_ID: &str = "<0191d5f4-2c1e-7c3a-9d0e-5b6f7a8b9c0d@example.com>";
