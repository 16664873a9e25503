use subtle::ConstantTimeEq;

use crate::crypto::sign::sign_md5;
use crate::model::params::NotifyParams;

/// Verify a notify URL signature.
///
/// Recomputes the MD5 digest over `params` (skipping `sign`) and compares it
/// with `signature` in constant time. The comparison is case-sensitive: the
/// provider always sends upper-case hex.
pub fn verify_md5_signature(params: &NotifyParams, pay_sign_key: &str, signature: &[u8]) -> bool {
    let expected = sign_md5(params, pay_sign_key);
    expected.as_bytes().ct_eq(signature).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(pairs: &[(&str, &str)], key: &str) -> (NotifyParams, String) {
        let params: NotifyParams = pairs.iter().copied().collect();
        let sig = sign_md5(&params, key);
        (params, sig)
    }

    #[test]
    fn test_verify_roundtrip() {
        let (params, sig) = signed(&[("partner", "P1"), ("total_fee", "100")], "secret");
        assert!(verify_md5_signature(&params, "secret", sig.as_bytes()));
    }

    #[test]
    fn test_verify_ignores_sign_param() {
        let (mut params, sig) = signed(&[("partner", "P1")], "secret");
        params.insert("sign", sig.clone());
        assert!(verify_md5_signature(&params, "secret", sig.as_bytes()));
    }

    #[test]
    fn test_verify_wrong_key() {
        let (params, sig) = signed(&[("partner", "P1")], "secret");
        assert!(!verify_md5_signature(&params, "Secret", sig.as_bytes()));
    }

    #[test]
    fn test_verify_tampered_value() {
        let (mut params, sig) = signed(&[("total_fee", "100")], "secret");
        params.remove("total_fee");
        params.insert("total_fee", "1");
        assert!(!verify_md5_signature(&params, "secret", sig.as_bytes()));
    }

    #[test]
    fn test_verify_gbk_value() {
        let mut params: NotifyParams = [("partner", "P1")].into_iter().collect();
        params.insert("pay_info", vec![0xD6, 0xD0]);
        let sig = sign_md5(&params, "secret");
        assert!(verify_md5_signature(&params, "secret", sig.as_bytes()));

        params.remove("pay_info");
        params.insert("pay_info", vec![0xD6, 0xD1]);
        assert!(!verify_md5_signature(&params, "secret", sig.as_bytes()));
    }

    #[test]
    fn test_verify_lowercase_signature_rejected() {
        let (params, sig) = signed(&[("partner", "P1")], "secret");
        assert!(!verify_md5_signature(&params, "secret", sig.to_lowercase().as_bytes()));
    }

    #[test]
    fn test_verify_truncated_signature_rejected() {
        let (params, sig) = signed(&[("partner", "P1")], "secret");
        assert!(!verify_md5_signature(&params, "secret", sig[..31].as_bytes()));
        assert!(!verify_md5_signature(&params, "secret", b""));
    }
}
