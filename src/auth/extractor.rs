use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

use crate::auth::identity::{self, TeamIdentity};
use crate::store::Store;

/// Header carrying the team secret on every request.
pub const ACCESS_KEY_HEADER: &str = "X-Access-Key";

impl FromRequest for TeamIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let key = match req
            .headers()
            .get(ACCESS_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            Some(k) => k,
            None => return ready(Err(ErrorUnauthorized("Missing access key"))),
        };

        let store = match req.app_data::<Data<Store>>() {
            Some(s) => s,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Store missing",
                )));
            }
        };

        let policies = store.policies.load();
        match identity::authenticate(&policies, key) {
            Some(identity) => ready(Ok(identity)),
            None => ready(Err(ErrorUnauthorized("Invalid access key"))),
        }
    }
}
