use crate::host::HostError;

/// Fatal start-up failures. Each maps to its own process exit code.
#[derive(thiserror::Error, Debug)]
pub enum StartupError
{
        #[error("platform initialization failed: {0:#}")]
        Platform(anyhow::Error),

        #[error("window class registration failed: {0}")]
        ClassRegistration(#[source] HostError),

        #[error("window creation failed for class `{0}`")]
        WindowCreation(String),
}

impl StartupError
{
        pub fn exit_code(&self) -> i32
        {
                match self
                {
                        StartupError::Platform(_) | StartupError::ClassRegistration(_) => 1,
                        StartupError::WindowCreation(_) => 2,
                }
        }
}
