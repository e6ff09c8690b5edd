//! POSIX termios structure and constants
//!
//! Terminal settings as seen by `TCGETS`/`TCSETS`: input, output,
//! control and local mode flags plus the control-character array.
//! Flag values follow the Linux layout; defaults match what the
//! subsystem applies once at startup (they are not reapplied on open).

use core::default::Default;

/// Number of entries in the control-character array
pub const NCCS: usize = 19;

// =============================================================================
// Input Flags (c_iflag)
// =============================================================================

/// Signal interrupt on break
pub const BRKINT: u32 = 0o000002;

/// Map CR to NL on input
pub const ICRNL: u32 = 0o000400;

// =============================================================================
// Output Flags (c_oflag)
// =============================================================================

/// Enable output post-processing
pub const OPOST: u32 = 0o000001;

/// Map NL to CR-NL on output
pub const ONLCR: u32 = 0o000004;

/// Tab delay mode mask
pub const TABDLY: u32 = 0o014000;

/// Expand tabs to spaces
pub const TAB3: u32 = 0o014000;

// =============================================================================
// Control Flags (c_cflag)
// =============================================================================

/// Character size mask
pub const CSIZE: u32 = 0o000060;

/// 8-bit characters
pub const CS8: u32 = 0o000060;

/// 9600 baud
pub const B9600: u32 = 0o000015;

// =============================================================================
// Local Flags (c_lflag)
// =============================================================================

/// Enable signal generation (INTR, SUSP)
pub const ISIG: u32 = 0o000001;

/// Canonical mode (line-by-line input with editing)
pub const ICANON: u32 = 0o000002;

/// Enable echo
pub const ECHO: u32 = 0o000010;

/// Echo ERASE as backspace-space-backspace
pub const ECHOE: u32 = 0o000020;

/// Echo NL even if ECHO is not set
pub const ECHONL: u32 = 0o000100;

// =============================================================================
// Control Character Indices (c_cc)
// =============================================================================

/// Interrupt character (SIGINT) - typically Ctrl+C
pub const VINTR: usize = 0;

/// Quit character - typically Ctrl+\
pub const VQUIT: usize = 1;

/// Erase character - typically Ctrl+H or DEL
pub const VERASE: usize = 2;

/// Kill line character - typically Ctrl+U
pub const VKILL: usize = 3;

/// End of file character - typically Ctrl+D
pub const VEOF: usize = 4;

/// Timeout in deciseconds for non-canonical read
pub const VTIME: usize = 5;

/// Minimum number of characters for non-canonical read
pub const VMIN: usize = 6;

/// Switch character (unused, kept for layout)
pub const VSWTC: usize = 7;

/// Start character for flow control - typically Ctrl+Q
pub const VSTART: usize = 8;

/// Stop character for flow control - typically Ctrl+S
pub const VSTOP: usize = 9;

/// Suspend character (SIGTSTP) - typically Ctrl+Z
pub const VSUSP: usize = 10;

/// Additional end-of-line character
pub const VEOL: usize = 11;

/// Reprint line character - typically Ctrl+R
pub const VREPRINT: usize = 12;

/// Discard output character - typically Ctrl+O
pub const VDISCARD: usize = 13;

/// Word erase character - typically Ctrl+W
pub const VWERASE: usize = 14;

/// Literal next character - typically Ctrl+V
pub const VLNEXT: usize = 15;

/// Second additional end-of-line character
pub const VEOL2: usize = 16;

// =============================================================================
// Termios Structure
// =============================================================================

/// Terminal I/O settings structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Termios {
    /// Input mode flags
    pub c_iflag: u32,

    /// Output mode flags
    pub c_oflag: u32,

    /// Control mode flags (baud rate, character size)
    pub c_cflag: u32,

    /// Local mode flags
    pub c_lflag: u32,

    /// Line discipline selector (0 = N_TTY)
    pub c_line: u8,

    /// Control characters array
    pub c_cc: [u8; NCCS],
}

impl Default for Termios {
    /// Settings applied to every terminal slot at startup.
    ///
    /// Canonical mode with echo and signals; CR mapped to NL on input;
    /// NL expanded to CR-NL on output; backspace (Ctrl+H) as erase.
    fn default() -> Self {
        let mut c_cc = [0u8; NCCS];
        c_cc[VINTR] = 3; // Ctrl+C
        c_cc[VQUIT] = 28; // Ctrl+\
        c_cc[VERASE] = 8; // Ctrl+H
        c_cc[VKILL] = 21; // Ctrl+U
        c_cc[VEOF] = 4; // Ctrl+D
        c_cc[VTIME] = 0;
        c_cc[VMIN] = 1;
        c_cc[VSTART] = 17; // Ctrl+Q
        c_cc[VSTOP] = 19; // Ctrl+S
        c_cc[VSUSP] = 26; // Ctrl+Z
        c_cc[VEOL] = 0;
        c_cc[VREPRINT] = 18; // Ctrl+R
        c_cc[VDISCARD] = 15; // Ctrl+O
        c_cc[VWERASE] = 23; // Ctrl+W
        c_cc[VLNEXT] = 22; // Ctrl+V
        c_cc[VEOL2] = 0;

        Self {
            c_iflag: BRKINT | ICRNL,
            c_oflag: OPOST | ONLCR,
            c_cflag: B9600 | CS8,
            c_lflag: ISIG | ICANON | ECHO | ECHOE,
            c_line: 0,
            c_cc,
        }
    }
}

impl Termios {
    /// Create a new termios with the startup defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if canonical (line) mode is enabled
    #[inline]
    pub fn is_canonical(&self) -> bool {
        (self.c_lflag & ICANON) != 0
    }

    /// Check if echo is enabled
    #[inline]
    pub fn is_echo(&self) -> bool {
        (self.c_lflag & ECHO) != 0
    }

    /// Check if signal generation is enabled
    #[inline]
    pub fn is_sig(&self) -> bool {
        (self.c_lflag & ISIG) != 0
    }

    /// Check if output post-processing is enabled
    #[inline]
    pub fn is_opost(&self) -> bool {
        (self.c_oflag & OPOST) != 0
    }

    /// Check if NL should be expanded to CR-NL on output
    #[inline]
    pub fn is_onlcr(&self) -> bool {
        (self.c_oflag & ONLCR) != 0
    }

    /// Check if CR should be mapped to NL on input
    #[inline]
    pub fn is_icrnl(&self) -> bool {
        (self.c_iflag & ICRNL) != 0
    }

    /// Check if tabs are expanded to spaces on output
    #[inline]
    pub fn is_tab_expand(&self) -> bool {
        (self.c_oflag & TABDLY) == TAB3
    }

    /// Get the interrupt character
    #[inline]
    pub fn intr_char(&self) -> u8 {
        self.c_cc[VINTR]
    }

    /// Get the suspend character
    #[inline]
    pub fn susp_char(&self) -> u8 {
        self.c_cc[VSUSP]
    }

    /// Get the EOF character
    #[inline]
    pub fn eof_char(&self) -> u8 {
        self.c_cc[VEOF]
    }

    /// Get the erase character
    #[inline]
    pub fn erase_char(&self) -> u8 {
        self.c_cc[VERASE]
    }

    /// Get the additional end-of-line character
    #[inline]
    pub fn eol_char(&self) -> u8 {
        self.c_cc[VEOL]
    }

    /// Get the VMIN value (minimum characters for non-canonical read)
    #[inline]
    pub fn vmin(&self) -> u8 {
        self.c_cc[VMIN]
    }

    /// Get the VTIME value (inter-byte timeout in deciseconds)
    #[inline]
    pub fn vtime(&self) -> u8 {
        self.c_cc[VTIME]
    }

    /// Set raw mode: disable canonical processing, echo and signals,
    /// deliver input character-at-a-time.
    pub fn set_raw(&mut self) {
        self.c_lflag &= !(ICANON | ECHO | ECHOE | ECHONL | ISIG);
        self.c_iflag &= !ICRNL;
        self.c_cc[VMIN] = 1;
        self.c_cc[VTIME] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_modes() {
        let termios = Termios::default();

        assert!(termios.is_canonical());
        assert!(termios.is_echo());
        assert!(termios.is_sig());
        assert!(termios.is_opost());
        assert!(termios.is_onlcr());
        assert!(termios.is_icrnl());
        assert!(!termios.is_tab_expand());
    }

    #[test]
    fn default_control_chars() {
        let termios = Termios::default();

        assert_eq!(termios.intr_char(), 3); // Ctrl+C
        assert_eq!(termios.eof_char(), 4); // Ctrl+D
        assert_eq!(termios.erase_char(), 8); // Ctrl+H
        assert_eq!(termios.susp_char(), 26); // Ctrl+Z
        assert_eq!(termios.vmin(), 1);
        assert_eq!(termios.vtime(), 0);
    }

    #[test]
    fn default_flag_words() {
        let termios = Termios::default();

        assert_eq!(termios.c_iflag, BRKINT | ICRNL);
        assert_eq!(termios.c_oflag, OPOST | ONLCR);
        assert_eq!(termios.c_cflag, B9600 | CS8);
        assert_eq!(termios.c_lflag, ISIG | ICANON | ECHO | ECHOE);
        assert_eq!(termios.c_line, 0);
    }

    #[test]
    fn raw_mode_disables_line_processing() {
        let mut termios = Termios::default();
        termios.set_raw();

        assert!(!termios.is_canonical());
        assert!(!termios.is_echo());
        assert!(!termios.is_sig());
        assert!(!termios.is_icrnl());
        assert_eq!(termios.vmin(), 1);
        assert_eq!(termios.vtime(), 0);
    }

    #[test]
    fn tab_expand_requires_tab3() {
        let mut termios = Termios::default();
        assert!(!termios.is_tab_expand());

        termios.c_oflag |= TAB3;
        assert!(termios.is_tab_expand());
    }

    #[test]
    fn accessors_match_cc_indices() {
        let termios = Termios::default();

        assert_eq!(termios.intr_char(), termios.c_cc[VINTR]);
        assert_eq!(termios.susp_char(), termios.c_cc[VSUSP]);
        assert_eq!(termios.eof_char(), termios.c_cc[VEOF]);
        assert_eq!(termios.erase_char(), termios.c_cc[VERASE]);
        assert_eq!(termios.eol_char(), termios.c_cc[VEOL]);
    }
}
