mod graph_forward;
