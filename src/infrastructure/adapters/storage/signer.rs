//! URL Signer - HMAC-SHA256 签名的媒体访问链接
//!
//! 签名内容为 `{path}|{expires}`，expires 为 Unix 秒

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 签名链接的媒体路由前缀
pub const MEDIA_ROUTE_PREFIX: &str = "/media";

/// URL 签名器
#[derive(Clone)]
pub struct UrlSigner {
    keyed: HmacSha256,
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            keyed: HmacSha256::new_from_slice(secret.as_ref())
                .expect("HMAC can take key of any size"),
        }
    }

    fn mac(&self, path: &str, expires: i64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(path.as_bytes());
        mac.update(b"|");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    /// 计算签名（十六进制）
    pub fn sign(&self, path: &str, expires: i64) -> String {
        hex::encode(self.mac(path, expires).finalize().into_bytes())
    }

    /// 生成完整签名链接
    pub fn signed_url(&self, base_url: &str, path: &str, expires: i64) -> String {
        format!(
            "{}{}/{}?expires={}&signature={}",
            base_url.trim_end_matches('/'),
            MEDIA_ROUTE_PREFIX,
            path,
            expires,
            self.sign(path, expires)
        )
    }

    /// 校验签名与有效期（常量时间比较）
    pub fn verify(&self, path: &str, expires: i64, signature: &str, now: i64) -> bool {
        if expires < now {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        self.mac(path, expires).verify_slice(&signature).is_ok()
    }
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}
