use std::{ffi::OsString, format, string::String, vec::Vec};

use serde::Deserialize;

use crate::IdentifyOptions;

const PREFIX: &str = "NSQ_";

#[derive(Debug, Deserialize)]
struct FromEnv {
    client_id: Option<String>,
    hostname: Option<String>,
    user_agent: Option<String>,
}

impl IdentifyOptions {
    /// Construct [`IdentifyOptions`] from environment variables
    ///
    /// Reads the following environment variables:
    ///
    /// * `NSQ_CLIENT_ID`
    /// * `NSQ_HOSTNAME`
    /// * `NSQ_USER_AGENT`
    ///
    /// Unset variables are left to the server defaults.
    /// Variables without the `NSQ_` prefix are ignored, even if they aren't valid unicode.
    ///
    /// # Errors
    ///
    /// It returns an error if an `NSQ_` variable isn't valid unicode.
    pub fn from_env() -> Result<Self, envy::Error> {
        from_iter(prefixed_vars(std::env::vars_os())?)
    }
}

fn prefixed_vars<I>(vars: I) -> Result<Vec<(String, String)>, envy::Error>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut prefixed = Vec::new();
    for (key, value) in vars {
        let Ok(key) = key.into_string() else {
            continue;
        };
        if !key.starts_with(PREFIX) {
            continue;
        }

        let value = value
            .into_string()
            .map_err(|_| envy::Error::Custom(format!("{key} isn't valid unicode")))?;
        prefixed.push((key, value));
    }

    Ok(prefixed)
}

fn from_iter<I>(vars: I) -> Result<IdentifyOptions, envy::Error>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env = envy::prefixed(PREFIX).from_iter::<_, FromEnv>(vars)?;

    let mut this = IdentifyOptions::new();
    this.client_id = env.client_id;
    this.hostname = env.hostname;
    this.user_agent = env.user_agent;
    Ok(this)
}

#[cfg(test)]
mod tests {
    use std::{
        borrow::ToOwned,
        ffi::OsString,
        string::{String, ToString},
        vec,
        vec::Vec,
    };

    use claims::{assert_err, assert_ok};

    use super::{from_iter, prefixed_vars};
    use crate::IdentifyOptions;

    #[test]
    fn prefixed() {
        let vars = [
            ("NSQ_CLIENT_ID", "worker-7"),
            ("NSQ_USER_AGENT", "billing/1.2"),
            ("HOSTNAME", "ignored"),
        ]
        .map(|(k, v)| (k.to_owned(), v.to_owned()));

        let options = assert_ok!(from_iter(vars));
        assert_eq!(
            IdentifyOptions::new()
                .client_id("worker-7")
                .user_agent("billing/1.2"),
            options
        );
    }

    #[test]
    fn no_vars() {
        let options = assert_ok!(from_iter(Vec::<(String, String)>::new()));
        assert_eq!(IdentifyOptions::new(), options);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_vars() {
        use std::os::unix::ffi::OsStringExt as _;

        let invalid = || OsString::from_vec(vec![0xff, 0xfe]);

        let vars = [
            (OsString::from("UNRELATED_VAR"), invalid()),
            (invalid(), OsString::from("value")),
            (OsString::from("NSQ_CLIENT_ID"), OsString::from("worker-7")),
        ];
        let vars = assert_ok!(prefixed_vars(vars));
        assert_eq!(
            vec![("NSQ_CLIENT_ID".to_owned(), "worker-7".to_owned())],
            vars
        );
        let options = assert_ok!(from_iter(vars));
        assert_eq!(IdentifyOptions::new().client_id("worker-7"), options);

        let err = assert_err!(prefixed_vars([(OsString::from("NSQ_HOSTNAME"), invalid())]));
        assert!(err.to_string().contains("NSQ_HOSTNAME"));
    }
}
