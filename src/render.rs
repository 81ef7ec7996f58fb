pub mod frame;
pub mod pipeline;
pub mod sink;
pub mod storyboard;
