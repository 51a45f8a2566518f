/// Actions that key events ask the controller to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Enter on the login screen
    Login,
    /// Submit the composer contents
    Submit,
    /// Start or stop dictation
    ToggleMic,
    ScrollUp,
    ScrollDown,
    /// Blocking alert dismissed
    DismissAlert,
    Quit,
}
