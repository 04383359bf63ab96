mod add_measurements;
mod helpers;
mod recommend;
mod workflow;
