use crate::model::params::NotifyParams;

/// Name of the parameter carrying the signature; never part of the signed string.
pub const SIGN_PARAM: &str = "sign";

/// Build the canonical byte string signed by the notify URL MD5 scheme.
///
/// Format: `"{k1}={v1}&{k1}={v1'}&{k2}={v2}&key={pay_sign_key}"`
///
/// - keys sorted byte-wise ascending, `sign` skipped
/// - values under one key emitted in arrival order, not re-sorted
/// - values copied as raw bytes, whatever the declared charset
pub fn build_sign_string(params: &NotifyParams, pay_sign_key: &str) -> Vec<u8> {
    let mut keys: Vec<&str> = params.keys().filter(|k| *k != SIGN_PARAM).collect();
    keys.sort_unstable();

    let mut buf = Vec::new();
    for key in keys {
        for value in params.get_all(key) {
            if !buf.is_empty() {
                buf.push(b'&');
            }
            buf.extend_from_slice(key.as_bytes());
            buf.push(b'=');
            buf.extend_from_slice(value);
        }
    }
    if !buf.is_empty() {
        buf.push(b'&');
    }
    buf.extend_from_slice(b"key=");
    buf.extend_from_slice(pay_sign_key.as_bytes());
    buf
}

/// Sign the parameters with MD5 and return the upper-case hex digest.
pub fn sign_md5(params: &NotifyParams, pay_sign_key: &str) -> String {
    let digest = md5::compute(build_sign_string(params, pay_sign_key));
    hex::encode_upper(digest.0)
}
