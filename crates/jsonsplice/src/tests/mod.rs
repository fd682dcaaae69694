mod splice_good;
