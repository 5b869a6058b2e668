// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads `url`, failing on network errors and non-2xx status.
pub fn fetch(url: &str) -> Result<Vec<u8>> {
    let wrap = |source| Error::Fetch {
        url: url.to_owned(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(wrap)?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(wrap)?;
    let bytes = response.bytes().map_err(wrap)?;

    debug!(url, len = bytes.len(), "fetched image");
    Ok(bytes.to_vec())
}
