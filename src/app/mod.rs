// Application layer - Use case interactors and session state

pub mod container;
pub mod render_interactor;
pub mod session;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use render_interactor::{RenderInteractor, RenderRequest};
pub use session::{EditorSession, PreviewHandle, ProcessingGuard};
