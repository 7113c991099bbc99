pub mod button;
pub mod loading;
pub mod popup;
pub mod presenter;

pub use button::Pressable;
pub use loading::loading_popup;
pub use popup::{
    ApproxMeasure, ContentKind, ContentMeasure, Popup, PopupButton, PopupItem, PopupPhase,
    TextLayout,
};
pub use presenter::PopupPresenter;
