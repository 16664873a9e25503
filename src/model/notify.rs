use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::time::Timestamp;

/// `trade_mode`: immediate settlement. Other values are reserved.
pub const TRADE_MODE_IMMEDIATE: i64 = 1;
/// `trade_state`: payment succeeded. Other values are reserved.
pub const TRADE_STATE_SUCCESS: i64 = 0;
/// `fee_type`: RMB, the only currency currently issued.
pub const FEE_TYPE_CNY: i64 = 1;

/// Declared `input_charset` of the notification.
///
/// Stricter than the provider, which treats the value as free text: anything
/// but GBK or UTF-8 fails decoding with `MalformedField`. The charset is only
/// recorded; values are never transcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Charset {
    #[serde(rename = "GBK")]
    Gbk,
    #[serde(rename = "UTF-8")]
    Utf8,
}

impl Charset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Gbk => "GBK",
            Charset::Utf8 => "UTF-8",
        }
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GBK") {
            Ok(Charset::Gbk)
        } else if s.eq_ignore_ascii_case("UTF-8") || s.eq_ignore_ascii_case("UTF8") {
            Ok(Charset::Utf8)
        } else {
            Err(format!("unsupported charset: {s}"))
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared `sign_type` of the notification.
///
/// Only the MD5 keyed digest is verified; `Rsa` is recorded as declared.
/// Stricter than the provider, which treats the value as free text: any other
/// value fails decoding with `MalformedField`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignMethod {
    #[serde(rename = "MD5")]
    Md5,
    #[serde(rename = "RSA")]
    Rsa,
}

impl SignMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignMethod::Md5 => "MD5",
            SignMethod::Rsa => "RSA",
        }
    }
}

impl FromStr for SignMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("MD5") {
            Ok(SignMethod::Md5)
        } else if s.eq_ignore_ascii_case("RSA") {
            Ok(SignMethod::Rsa)
        } else {
            Err(format!("unsupported sign type: {s}"))
        }
    }
}

impl fmt::Display for SignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified payment-result notification decoded from the notify URL query string.
///
/// All fees are in fen (minor currency unit).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifyUrlData {
    // ---- protocol ----
    pub service_version: String,
    pub charset: Charset,
    pub signature: String,
    pub sign_method: SignMethod,
    pub sign_key_index: i64,

    // ---- business ----
    /// Some merchants only receive this id and must query the trade result with it.
    pub notify_id: String,
    pub trade_mode: i64,
    pub trade_state: i64,
    /// Raw bytes in the declared charset. Empty when the payment succeeded.
    #[serde(serialize_with = "serialize_lossy")]
    pub pay_info: Vec<u8>,
    pub bank_billno: String,
    /// 28 digits: 10-digit merchant id, 8-digit order date, 10-digit serial.
    pub transaction_id: String,
    pub time_end: Timestamp,
    pub bank_type: String,
    pub partner: String,
    pub out_trade_no: String,
    /// Merchant data echoed back as raw bytes in the declared charset.
    #[serde(serialize_with = "serialize_lossy")]
    pub attach: Vec<u8>,
    pub total_fee: i64,
    /// When non-zero, `total_fee + discount` equals the `total_fee` of the
    /// original payment bill. The bill is not available here, so the caller
    /// must check this.
    pub discount: i64,
    pub transport_fee: i64,
    pub product_fee: i64,
    pub fee_type: i64,
    pub buyer_alias: String,
}

impl NotifyUrlData {
    pub fn is_trade_success(&self) -> bool {
        self.trade_state == TRADE_STATE_SUCCESS
    }

    pub fn is_immediate_settlement(&self) -> bool {
        self.trade_mode == TRADE_MODE_IMMEDIATE
    }

    pub fn is_cny(&self) -> bool {
        self.fee_type == FEE_TYPE_CNY
    }

    /// `pay_info` as text, when it is valid UTF-8.
    pub fn pay_info_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.pay_info).ok()
    }

    /// `attach` as text, when it is valid UTF-8.
    pub fn attach_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.attach).ok()
    }
}

fn serialize_lossy<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}
