//! Toast notifications for Windows.
//!
//! Unobtrusive notifications for switch results and controller
//! failures. The agent keeps running regardless; a toast that fails
//! to show is only worth a log line.

use tracing::{debug, warn};

/// Notify that the output device was switched.
pub fn notify_switch_applied(device_name: &str) {
    #[cfg(windows)]
    {
        use winrt_notification::{Duration, Toast};

        debug!(device = device_name, "Showing switch notification");

        // Silent toast; audio feedback while switching outputs is noise.
        let result = Toast::new(Toast::POWERSHELL_APP_ID)
            .title("Audio output switched")
            .text1(device_name)
            .duration(Duration::Short)
            .show();

        if let Err(e) = result {
            warn!(error = %e, "Failed to show toast notification");
        }
    }

    #[cfg(not(windows))]
    {
        debug!(
            device = device_name,
            "Output switched (notifications not supported)"
        );
    }
}

/// Notify that a controller call failed.
pub fn notify_controller_error(context: &str, error: &str) {
    #[cfg(windows)]
    {
        use winrt_notification::{Duration, Sound, Toast};

        // Truncate error message if too long
        let error_short = if error.len() > 120 {
            format!("{}...", &error[..120])
        } else {
            error.to_string()
        };

        debug!(context, "Showing controller error notification");

        let result = Toast::new(Toast::POWERSHELL_APP_ID)
            .title("AudioSwitch")
            .text1(context)
            .text2(&error_short)
            .sound(Some(Sound::Default))
            .duration(Duration::Short)
            .show();

        if let Err(e) = result {
            warn!(error = %e, "Failed to show toast notification");
        }
    }

    #[cfg(not(windows))]
    {
        debug!(context, error, "Controller error (notifications not supported)");
    }
}
