pub mod batsman;
pub mod score;

pub use batsman::{Batsman, DismissalType, End, ROSTER_SIZE};
pub use score::{Extras, Score};
