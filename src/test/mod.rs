mod netsim;
mod simulator;
mod traffic_matrix;
