pub mod deemphasis;
pub mod fir_core;
pub mod gain;
pub mod limiter;
pub mod lowpass;
pub mod quadrature;
pub mod stage;

pub use deemphasis::Deemphasis;
pub use fir_core::FirFilterCore;
pub use gain::{Gain, amplify};
pub use limiter::Limiter;
pub use lowpass::{NBFM_LOWPASS_NUM_TAPS, NBFM_LOWPASS_TAPS, NbfmLowpass};
pub use quadrature::QuadratureDemodulator;
pub use stage::Stage;
