pub(crate) mod nearest_neighbor;
pub(crate) mod optimizer;
pub(crate) mod start_sampler;
pub(crate) mod two_opt;
