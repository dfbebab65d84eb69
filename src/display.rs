use reqwest::StatusCode;
use serde::Serialize;

use crate::{CallContext, MistyClient, MistyError, Result};

const LED_CHANGE_PATH: &str = "/api/led/change";

/// Body of `POST /api/led/change`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LedColor {
    pub red: u8,
    pub blue: u8,
    pub green: u8,
}

/// Commands for the robot's chest LED and display.
#[derive(Clone, Copy, Debug)]
pub struct DisplayService<'a> {
    client: &'a MistyClient,
}

impl<'a> DisplayService<'a> {
    pub(crate) fn new(client: &'a MistyClient) -> Self {
        Self { client }
    }

    /// Changes the LED color.
    ///
    /// Anything but `200 OK` is reported as [`MistyError::Http`].
    pub async fn change_led(
        &self,
        ctx: &CallContext,
        red: u8,
        green: u8,
        blue: u8,
    ) -> Result<()> {
        let payload = LedColor { red, blue, green };

        #[cfg(feature = "tracing")]
        tracing::debug!(?payload, "sending command");

        let response = self.client.post(ctx, LED_CHANGE_PATH, &payload).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.map_err(MistyError::Transport)?;
            return Err(MistyError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
