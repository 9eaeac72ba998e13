mod labels;
mod visits;
