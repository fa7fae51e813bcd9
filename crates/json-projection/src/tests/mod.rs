mod projection;
mod utils;
