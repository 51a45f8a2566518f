pub mod alert;
pub mod footer;
pub mod header;
pub mod login;

pub use alert::AlertPopup;
pub use footer::Footer;
pub use header::Header;
pub use login::LoginView;
