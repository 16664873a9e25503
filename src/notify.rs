use std::fmt::Display;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::crypto::sign::SIGN_PARAM;
use crate::crypto::verify::verify_md5_signature;
use crate::error::NotifyError;
use crate::model::notify::{NotifyUrlData, SignMethod};
use crate::model::params::NotifyParams;
use crate::time::{TimeParser, Timestamp, parse_time};
use crate::verifier::NotifyVerifier;

/// Presence rule of a notify URL parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    /// Used when the parameter is absent or empty.
    Default(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Field {
    pub(crate) name: &'static str,
    pub(crate) presence: Presence,
}

const fn required(name: &'static str) -> Field {
    Field {
        name,
        presence: Presence::Required,
    }
}

const fn optional(name: &'static str, default: &'static str) -> Field {
    Field {
        name,
        presence: Presence::Default(default),
    }
}

pub(crate) const SERVICE_VERSION: Field = optional("service_version", "1.0");
pub(crate) const INPUT_CHARSET: Field = optional("input_charset", "GBK");
pub(crate) const SIGN_TYPE: Field = optional("sign_type", "MD5");
pub(crate) const SIGN_KEY_INDEX: Field = optional("sign_key_index", "1");
pub(crate) const NOTIFY_ID: Field = required("notify_id");
pub(crate) const TRADE_MODE: Field = required("trade_mode");
pub(crate) const TRADE_STATE: Field = required("trade_state");
pub(crate) const PAY_INFO: Field = optional("pay_info", "");
pub(crate) const BANK_BILLNO: Field = optional("bank_billno", "");
pub(crate) const TRANSACTION_ID: Field = required("transaction_id");
pub(crate) const TIME_END: Field = required("time_end");
pub(crate) const BANK_TYPE: Field = required("bank_type");
pub(crate) const PARTNER: Field = required("partner");
pub(crate) const OUT_TRADE_NO: Field = required("out_trade_no");
pub(crate) const ATTACH: Field = optional("attach", "");
pub(crate) const TOTAL_FEE: Field = required("total_fee");
pub(crate) const DISCOUNT: Field = optional("discount", "0");
pub(crate) const TRANSPORT_FEE: Field = optional("transport_fee", "0");
pub(crate) const PRODUCT_FEE: Field = optional("product_fee", "0");
pub(crate) const FEE_TYPE: Field = required("fee_type");
pub(crate) const BUYER_ALIAS: Field = optional("buyer_alias", "");

/// Every recognized parameter besides `sign`, in extraction order.
pub(crate) const NOTIFY_URL_FIELDS: [Field; 21] = [
    SERVICE_VERSION,
    INPUT_CHARSET,
    SIGN_TYPE,
    SIGN_KEY_INDEX,
    NOTIFY_ID,
    TRADE_MODE,
    TRADE_STATE,
    PAY_INFO,
    BANK_BILLNO,
    TRANSACTION_ID,
    TIME_END,
    BANK_TYPE,
    PARTNER,
    OUT_TRADE_NO,
    ATTACH,
    TOTAL_FEE,
    DISCOUNT,
    TRANSPORT_FEE,
    PRODUCT_FEE,
    FEE_TYPE,
    BUYER_ALIAS,
];

/// Typed access to notify URL parameters through their [`Field`] rules.
struct FieldReader<'a> {
    params: &'a NotifyParams,
}

impl<'a> FieldReader<'a> {
    fn new(params: &'a NotifyParams) -> Self {
        Self { params }
    }

    /// First non-empty value, else the field default, else `MissingField`.
    fn raw(&self, field: &Field) -> Result<&'a [u8], NotifyError> {
        match self.params.first(field.name).filter(|v| !v.is_empty()) {
            Some(value) => Ok(value),
            None => match field.presence {
                Presence::Required => Err(NotifyError::MissingField(field.name)),
                Presence::Default(default) => Ok(default.as_bytes()),
            },
        }
    }

    /// Raw value as UTF-8 text; other bytes are `MalformedField`.
    fn utf8(&self, field: &Field) -> Result<&'a str, NotifyError> {
        std::str::from_utf8(self.raw(field)?).map_err(|e| NotifyError::malformed(field.name, e))
    }

    /// Opaque value kept as raw bytes in the declared charset.
    fn bytes(&self, field: &Field) -> Result<Vec<u8>, NotifyError> {
        self.raw(field).map(<[u8]>::to_vec)
    }

    fn text(&self, field: &Field) -> Result<String, NotifyError> {
        self.utf8(field).map(str::to_owned)
    }

    /// Parse integers and enumerations; a parse failure is `MalformedField`.
    fn parse<T>(&self, field: &Field) -> Result<T, NotifyError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.utf8(field)?
            .parse()
            .map_err(|e| NotifyError::malformed(field.name, e))
    }

    fn time(&self, field: &Field, parser: TimeParser) -> Result<Timestamp, NotifyError> {
        parser(self.utf8(field)?).map_err(|e| NotifyError::malformed(field.name, e))
    }
}

/// Verify and decode a notify URL callback, parsing `time_end` with [`parse_time`].
///
/// `params` is only borrowed; the `sign` parameter is skipped rather than removed.
pub fn decode_notify_url(
    params: &NotifyParams,
    pay_sign_key: &str,
) -> Result<NotifyUrlData, NotifyError> {
    decode(params, pay_sign_key, parse_time)
}

impl NotifyVerifier {
    /// Verify and decode notify URL parameters already split by the HTTP layer.
    pub fn parse_notify_url(&self, params: &NotifyParams) -> Result<NotifyUrlData, NotifyError> {
        decode(params, &self.config.pay_sign_key, self.config.time_parser)
    }

    /// Verify and decode a raw notify URL query string.
    pub fn parse_notify_query(&self, query: &str) -> Result<NotifyUrlData, NotifyError> {
        let params = NotifyParams::parse_query(query)?;
        self.parse_notify_url(&params)
    }
}

fn decode(
    params: &NotifyParams,
    pay_sign_key: &str,
    time_parser: TimeParser,
) -> Result<NotifyUrlData, NotifyError> {
    if params.is_empty() {
        return Err(NotifyError::InvalidInput);
    }

    let signature = match params.first(SIGN_PARAM) {
        Some(sig) if !sig.is_empty() => sig,
        _ => return Err(NotifyError::MissingSignature),
    };

    debug!(params = params.len(), "verifying notify url signature");

    // Nothing below may be read before the signature checks out.
    if !verify_md5_signature(params, pay_sign_key, signature) {
        warn!(params = params.len(), "notify url signature verification failed");
        return Err(NotifyError::SignatureMismatch);
    }

    for key in params.keys().filter(|k| !is_known_param(k)) {
        debug!(param = key, "ignoring unrecognized notify url parameter");
    }

    let fields = FieldReader::new(params);

    let data = NotifyUrlData {
        service_version: fields.text(&SERVICE_VERSION)?,
        charset: fields.parse(&INPUT_CHARSET)?,
        signature: String::from_utf8_lossy(signature).into_owned(),
        sign_method: fields.parse(&SIGN_TYPE)?,
        sign_key_index: fields.parse(&SIGN_KEY_INDEX)?,
        notify_id: fields.text(&NOTIFY_ID)?,
        trade_mode: fields.parse(&TRADE_MODE)?,
        trade_state: fields.parse(&TRADE_STATE)?,
        pay_info: fields.bytes(&PAY_INFO)?,
        bank_billno: fields.text(&BANK_BILLNO)?,
        transaction_id: fields.text(&TRANSACTION_ID)?,
        time_end: fields.time(&TIME_END, time_parser)?,
        bank_type: fields.text(&BANK_TYPE)?,
        partner: fields.text(&PARTNER)?,
        out_trade_no: fields.text(&OUT_TRADE_NO)?,
        attach: fields.bytes(&ATTACH)?,
        total_fee: fields.parse(&TOTAL_FEE)?,
        discount: fields.parse(&DISCOUNT)?,
        transport_fee: fields.parse(&TRANSPORT_FEE)?,
        product_fee: fields.parse(&PRODUCT_FEE)?,
        fee_type: fields.parse(&FEE_TYPE)?,
        buyer_alias: fields.text(&BUYER_ALIAS)?,
    };

    check_fees(&data)?;

    if data.sign_method != SignMethod::Md5 {
        warn!(
            sign_type = %data.sign_method,
            notify_id = %data.notify_id,
            "notification declares a non-MD5 sign_type; only the MD5 digest was verified"
        );
    }

    debug!(
        notify_id = %data.notify_id,
        out_trade_no = %data.out_trade_no,
        trade_state = data.trade_state,
        "notify url verified"
    );

    Ok(data)
}

fn is_known_param(key: &str) -> bool {
    key == SIGN_PARAM || NOTIFY_URL_FIELDS.iter().any(|f| f.name == key)
}

/// `transport_fee + product_fee == total_fee` whenever either split fee is set.
fn check_fees(data: &NotifyUrlData) -> Result<(), NotifyError> {
    if data.transport_fee == 0 && data.product_fee == 0 {
        return Ok(());
    }
    let split_total = data.transport_fee.checked_add(data.product_fee);
    if split_total != Some(data.total_fee) {
        return Err(NotifyError::InconsistentFees {
            total_fee: data.total_fee,
            transport_fee: data.transport_fee,
            product_fee: data.product_fee,
        });
    }
    Ok(())
}
