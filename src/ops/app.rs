use super::Operation;
use crate::{
    bridge::ExecutionRequest,
    errors::BridgeResult,
    security::{checked, escape, ArgumentKind},
};
use clap::Subcommand;
use std::{fmt, str::FromStr};

/// An `http` or `https` address. Anything else would let `Start-Process`
/// launch a local program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebUrl(String);

impl FromStr for WebUrl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let rest = lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"))
            .ok_or_else(|| format!("{s:?} is not an http(s) URL"))?;
        if rest.is_empty() || s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(format!("{s:?} is not an http(s) URL"));
        }
        Ok(WebUrl(s.to_string()))
    }
}

impl fmt::Display for WebUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum AppOp {
    /// Start a program by name or path
    Launch {
        name: String,
        /// Argument string handed to the program
        #[arg(long)]
        arguments: Option<String>,
        #[arg(long, conflicts_with = "maximized")]
        minimized: bool,
        #[arg(long)]
        maximized: bool,
    },
    /// List processes that own a window
    Windows,
    /// Close windows whose title contains the pattern
    Close {
        title: String,
        #[arg(long)]
        force: bool,
    },
    /// Reveal a file in Explorer
    Open { path: String },
    /// Open an address in the default browser
    Url { address: WebUrl },
    /// Capture the primary screen or the foreground window to a PNG
    Screenshot {
        #[arg(long, default_value = "screenshot.png")]
        file: String,
        /// Only the foreground window
        #[arg(long)]
        window: bool,
    },
    /// Send keystrokes to the foreground window
    Keysend {
        keys: String,
        /// Milliseconds to wait after sending
        #[arg(long, default_value_t = 100)]
        wait: u64,
    },
}

const SCREEN_BOUNDS: &str = "Add-Type -AssemblyName System.Windows.Forms
Add-Type -AssemblyName System.Drawing
$bounds = [System.Windows.Forms.Screen]::PrimaryScreen.Bounds
";

const WINDOW_BOUNDS: &str = "Add-Type -AssemblyName System.Drawing
Add-Type @'
using System;
using System.Runtime.InteropServices;
public struct WinRect { public int Left; public int Top; public int Right; public int Bottom; }
public static class ForegroundWindow {
    [DllImport(\"user32.dll\")] public static extern IntPtr GetForegroundWindow();
    [DllImport(\"user32.dll\")] public static extern bool GetWindowRect(IntPtr hWnd, out WinRect rect);
}
'@
$r = New-Object WinRect
[void][ForegroundWindow]::GetWindowRect([ForegroundWindow]::GetForegroundWindow(), [ref]$r)
$bounds = [System.Drawing.Rectangle]::FromLTRB($r.Left, $r.Top, $r.Right, $r.Bottom)
";

const CAPTURE: &str = "$bmp = New-Object System.Drawing.Bitmap($bounds.Width, $bounds.Height)
$graphics = [System.Drawing.Graphics]::FromImage($bmp)
$graphics.CopyFromScreen($bounds.Location, [System.Drawing.Point]::Empty, $bounds.Size)
";

/// Brace tokens people type for modifier keys, in SendKeys notation.
const KEY_TOKENS: &[(&str, &str)] = &[
    ("{ENTER}", "{Enter}"),
    ("{TAB}", "{Tab}"),
    ("{ESC}", "{Esc}"),
    ("{CTRL}", "^"),
    ("{ALT}", "%"),
    ("{SHIFT}", "+"),
];

fn send_keys_notation(keys: &str) -> String {
    KEY_TOKENS.iter().fold(keys.to_string(), |acc, (from, to)| acc.replace(from, to))
}

impl Operation for AppOp {
    fn action(&self) -> &'static str {
        match self {
            AppOp::Launch { .. } => "app.launch",
            AppOp::Windows => "app.windows",
            AppOp::Close { .. } => "app.close",
            AppOp::Open { .. } => "app.open",
            AppOp::Url { .. } => "app.url",
            AppOp::Screenshot { .. } => "app.screenshot",
            AppOp::Keysend { .. } => "app.keysend",
        }
    }

    fn detail(&self) -> String {
        match self {
            AppOp::Launch { name, .. } => name.clone(),
            AppOp::Windows => String::new(),
            AppOp::Close { title, .. } => title.clone(),
            AppOp::Open { path } => path.clone(),
            AppOp::Url { address } => address.to_string(),
            AppOp::Screenshot { file, .. } => file.clone(),
            // keystrokes may be a typed password
            AppOp::Keysend { keys, .. } => format!("{} keys", keys.chars().count()),
        }
    }

    fn mutating(&self) -> bool {
        !matches!(self, AppOp::Windows)
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let command = match self {
            AppOp::Launch { name, arguments, minimized, maximized } => {
                let target = if name.contains('/') {
                    checked(name, ArgumentKind::FilesystemPath)?.to_string()
                } else {
                    format!("{}.exe", checked(name, ArgumentKind::SearchPattern)?)
                };
                let mut cmd = format!("Start-Process -FilePath \"{target}\"");
                if let Some(args) = arguments {
                    cmd.push_str(&format!(" -ArgumentList \"{}\"", escape(args)));
                }
                if *minimized {
                    cmd.push_str(" -WindowStyle Minimized");
                } else if *maximized {
                    cmd.push_str(" -WindowStyle Maximized");
                }
                cmd
            }
            AppOp::Windows => "Get-Process | Where-Object { $_.MainWindowTitle -ne \"\" } | Select-Object Id, ProcessName, MainWindowTitle | Format-Table -AutoSize".to_string(),
            AppOp::Close { title, force } => format!(
                "Get-Process | Where-Object {{ $_.MainWindowTitle -like \"*{}*\" }} | Stop-Process{}",
                checked(title, ArgumentKind::SearchPattern)?,
                if *force { " -Force" } else { "" }
            ),
            AppOp::Open { path } => {
                checked(path, ArgumentKind::FilesystemPath)?;
                let native = path.replace('/', "\\");
                format!("Start-Process explorer.exe -ArgumentList \"/select,{}\"", escape(&native))
            }
            AppOp::Url { address } => format!("Start-Process \"{}\"", escape(&address.0)),
            AppOp::Screenshot { file, window } => {
                let target = checked(file, ArgumentKind::FilesystemPath)?;
                let bounds = if *window { WINDOW_BOUNDS } else { SCREEN_BOUNDS };
                format!("{bounds}{CAPTURE}$bmp.Save(\"{target}\")\n$graphics.Dispose(); $bmp.Dispose()")
            }
            AppOp::Keysend { keys, wait } => format!(
                "Add-Type -AssemblyName System.Windows.Forms\n[System.Windows.Forms.SendKeys]::SendWait(\"{}\")\nStart-Sleep -Milliseconds {wait}",
                escape(&send_keys_notation(keys))
            ),
        };
        Ok(ExecutionRequest::new(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_by_name_appends_exe() {
        let op = AppOp::Launch { name: "notepad".into(), arguments: None, minimized: true, maximized: false };
        assert_eq!(
            op.request().unwrap().command_text,
            "Start-Process -FilePath \"notepad.exe\" -WindowStyle Minimized"
        );
    }

    #[test]
    fn launch_arguments_are_escaped() {
        let op = AppOp::Launch {
            name: "C:/Tools/app.exe".into(),
            arguments: Some("--name \"$env:USERNAME\"".into()),
            minimized: false,
            maximized: true,
        };
        assert_eq!(
            op.request().unwrap().command_text,
            "Start-Process -FilePath \"C:/Tools/app.exe\" -ArgumentList \"--name `\"`$env:USERNAME`\"\" -WindowStyle Maximized"
        );
    }

    #[test]
    fn launch_rejects_shell_names_and_traversal() {
        let bad_name = AppOp::Launch { name: "calc;Stop-Computer".into(), arguments: None, minimized: false, maximized: false };
        assert!(bad_name.request().is_err());
        let traversal = AppOp::Launch { name: "../evil.exe".into(), arguments: None, minimized: false, maximized: false };
        assert!(traversal.request().is_err());
    }

    #[test]
    fn close_matches_title_pattern() {
        let cmd = AppOp::Close { title: "Notepad".into(), force: true }.request().unwrap().command_text;
        assert_eq!(
            cmd,
            "Get-Process | Where-Object { $_.MainWindowTitle -like \"*Notepad*\" } | Stop-Process -Force"
        );
        assert!(AppOp::Close { title: "x\" }; Stop-Computer; {\"".into(), force: false }.request().is_err());
    }

    #[test]
    fn open_uses_native_separators() {
        let cmd = AppOp::Open { path: "C:/Users/bob/report.txt".into() }.request().unwrap().command_text;
        assert_eq!(cmd, "Start-Process explorer.exe -ArgumentList \"/select,C:\\Users\\bob\\report.txt\"");
        assert!(AppOp::Open { path: "C:/Windows/System32/cmd.exe".into() }.request().is_err());
    }

    #[test]
    fn urls_must_be_web_addresses() {
        assert!("https://example.com/?q=1".parse::<WebUrl>().is_ok());
        assert!("HTTP://example.com".parse::<WebUrl>().is_ok());
        assert!("calc.exe".parse::<WebUrl>().is_err());
        assert!("file:///C:/Windows".parse::<WebUrl>().is_err());
        assert!("https://".parse::<WebUrl>().is_err());
        assert!("https://a b".parse::<WebUrl>().is_err());
    }

    #[test]
    fn url_is_escaped() {
        let address: WebUrl = "https://example.com/?a=$x\"".parse().unwrap();
        let cmd = AppOp::Url { address }.request().unwrap().command_text;
        assert_eq!(cmd, "Start-Process \"https://example.com/?a=`$x`\"\"");
    }

    #[test]
    fn screenshot_saves_to_validated_path() {
        let cmd = AppOp::Screenshot { file: "shots/desk.png".into(), window: false }.request().unwrap().command_text;
        assert!(cmd.contains("PrimaryScreen.Bounds"));
        assert!(cmd.contains("$bmp.Save(\"shots/desk.png\")"));
        let cmd = AppOp::Screenshot { file: "w.png".into(), window: true }.request().unwrap().command_text;
        assert!(cmd.contains("GetForegroundWindow"));
        assert!(AppOp::Screenshot { file: "../w.png".into(), window: false }.request().is_err());
    }

    #[test]
    fn keysend_maps_tokens_and_hides_keys() {
        let op = AppOp::Keysend { keys: "{CTRL}s{ENTER}$x".into(), wait: 250 };
        let cmd = op.request().unwrap().command_text;
        assert!(cmd.contains("SendWait(\"^s{Enter}`$x\")"));
        assert!(cmd.ends_with("Start-Sleep -Milliseconds 250"));
        assert_eq!(op.detail(), "16 keys");
    }

    #[test]
    fn listing_windows_is_not_audited() {
        assert!(!AppOp::Windows.mutating());
        assert!(AppOp::Close { title: "x".into(), force: false }.mutating());
    }
}
